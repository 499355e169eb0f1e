use crate::xml::{XmlDocument, PR};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetMode {
    #[default]
    Internal,
    External,
}

/// One `Relationship` entry of a `.rels` part. Internal targets are stored as
/// absolute part names (no leading slash), already resolved against the source part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    #[serde(default)]
    pub target_mode: TargetMode,
}

impl Relationship {
    pub fn new(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::Internal,
        }
    }

    pub fn external(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::External,
        }
    }

    pub fn is_external(&self) -> bool {
        self.target_mode == TargetMode::External
    }

    /// Matches both the transitional and the strict relationship type URIs.
    pub fn has_type(&self, rel_type: &str) -> bool {
        self.rel_type == rel_type
            || relationship_types::short_name(&self.rel_type) == relationship_types::short_name(rel_type)
    }
}

/// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`; the package root maps to `_rels/.rels`.
pub fn rels_path_for(part_name: &str) -> String {
    let part_name = part_name.trim_start_matches('/');
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_name),
    }
}

/// Resolves a relationship target against the directory of its source part.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let source_part = source_part.trim_start_matches('/');
    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Reads a parsed `.rels` part belonging to `source_part`.
pub fn parse_relationships(source_part: &str, doc: &XmlDocument) -> Vec<Relationship> {
    let Some(root) = doc.root() else {
        return Vec::new();
    };
    let rel_name = PR::Relationship();

    doc.elements_by_name(root, &rel_name)
        .filter_map(|node| {
            let id = doc.attr(node, "Id")?;
            let rel_type = doc.attr(node, "Type")?;
            let target = doc.attr(node, "Target")?;
            if doc.attr(node, "TargetMode") == Some("External") {
                Some(Relationship::external(id, rel_type, target))
            } else {
                Some(Relationship::new(
                    id,
                    rel_type,
                    &resolve_target(source_part, target),
                ))
            }
        })
        .collect()
}

pub mod relationship_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const CUSTOM_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/custom-properties";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const NOTES_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const CHART: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

    /// Last path segment of a relationship type URI, e.g. `slideLayout`.
    pub fn short_name(rel_type: &str) -> &str {
        rel_type.rsplit('/').next().unwrap_or(rel_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser;

    #[test]
    fn rels_path_for_nested_and_root_parts() {
        assert_eq!(rels_path_for("ppt/slides/slide1.xml"), "ppt/slides/_rels/slide1.xml.rels");
        assert_eq!(rels_path_for("/ppt/presentation.xml"), "ppt/_rels/presentation.xml.rels");
        assert_eq!(rels_path_for(""), "_rels/.rels");
    }

    #[test]
    fn resolve_relative_and_absolute_targets() {
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(resolve_target("ppt/presentation.xml", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("", "ppt/presentation.xml"), "ppt/presentation.xml");
        assert_eq!(resolve_target("ppt/slides/slide1.xml", "/ppt/media/image1.png"), "ppt/media/image1.png");
    }

    #[test]
    fn parse_rels_part() {
        let xml = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
            <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
        </Relationships>"#;
        let doc = parser::parse(xml).unwrap();
        let rels = parse_relationships("ppt/slides/slide1.xml", &doc);

        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].target, "ppt/slideLayouts/slideLayout1.xml");
        assert!(rels[0].has_type(relationship_types::SLIDE_LAYOUT));
        assert!(rels[1].is_external());
        assert_eq!(rels[1].target, "https://example.com");
    }
}
