use crate::error::{DeckError, Result};
use crate::hash;
use crate::xml::{XmlDocument, P, R};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::content_types::content_type_values;
use super::ooxml::OoxmlPackage;
use super::relationships::{relationship_types, Relationship};

const DEFAULT_MAIN_PART: &str = "ppt/presentation.xml";

/// Slide dimensions in EMU, from `p:sldSz`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSize {
    pub width: i64,
    pub height: i64,
}

impl Default for SlideSize {
    /// 10in x 7.5in, the size PowerPoint assumes when `p:sldSz` is absent.
    fn default() -> Self {
        Self {
            width: 9_144_000,
            height: 6_858_000,
        }
    }
}

impl SlideSize {
    /// Reduced ratio such as `16:9`.
    pub fn aspect_ratio(&self) -> String {
        fn gcd(a: i64, b: i64) -> i64 {
            if b == 0 {
                a
            } else {
                gcd(b, a % b)
            }
        }
        let divisor = gcd(self.width.abs(), self.height.abs()).max(1);
        format!("{}:{}", self.width / divisor, self.height / divisor)
    }
}

/// A slide as listed in `p:sldIdLst`, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRef {
    /// `p:sldId/@id`; stable across reordering.
    pub slide_id: String,
    pub rel_id: String,
    pub part_name: String,
}

/// A package known to hold a transitional PresentationML document.
#[derive(Debug, Clone)]
pub struct PresentationPackage {
    package: OoxmlPackage,
    file_hash: String,
    main_part: String,
    slides: Vec<SlideRef>,
    master_parts: Vec<String>,
    slide_size: SlideSize,
}

impl PresentationPackage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("opening presentation {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let file_hash = hash::file_hash(bytes);
        let package = OoxmlPackage::open(bytes)?;
        Self::from_package(package, file_hash)
    }

    fn from_package(package: OoxmlPackage, file_hash: String) -> Result<Self> {
        let main_part = package
            .relationships("")?
            .into_iter()
            .find(|r| r.has_type(relationship_types::OFFICE_DOCUMENT) && !r.is_external())
            .map(|r| r.target)
            .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());

        if !package.has_part(&main_part) {
            return Err(DeckError::corrupt(&main_part, "main presentation part is missing"));
        }

        match package.content_type(&main_part) {
            Some(ct) if content_type_values::is_presentation_main(ct) => {}
            Some(ct) => {
                return Err(DeckError::UnsupportedFormat {
                    message: format!("main part content type '{}' is not a presentation", ct),
                })
            }
            None => {
                return Err(DeckError::UnsupportedFormat {
                    message: format!("main part '{}' has no content type", main_part),
                })
            }
        }

        let doc = package.get_xml_part(&main_part)?;
        let root = doc
            .root()
            .ok_or_else(|| DeckError::corrupt(&main_part, "empty document"))?;
        check_root(&doc, root)?;

        let slide_size = read_slide_size(&doc, root, &main_part)?;
        let rels = package.relationships(&main_part)?;

        let mut slides = Vec::new();
        if let Some(list) = doc.first_child(root, &P::sldIdLst()) {
            for node in doc.elements_by_name(list, &P::sldId()) {
                let slide_id = doc
                    .attr(node, "id")
                    .ok_or_else(|| DeckError::corrupt(&main_part, "p:sldId without id"))?;
                let rel_id = doc
                    .attr_ns(node, &R::id())
                    .ok_or_else(|| DeckError::corrupt(&main_part, "p:sldId without r:id"))?;
                let part_name = resolve_rel(&rels, rel_id, &main_part)?;
                if !package.has_part(&part_name) {
                    return Err(DeckError::corrupt(
                        &part_name,
                        format!("slide {} listed in p:sldIdLst is missing", slide_id),
                    ));
                }
                slides.push(SlideRef {
                    slide_id: slide_id.to_string(),
                    rel_id: rel_id.to_string(),
                    part_name,
                });
            }
        }

        let mut master_parts = Vec::new();
        if let Some(list) = doc.first_child(root, &P::sldMasterIdLst()) {
            for node in doc.child_elements(list) {
                let Some(rel_id) = doc.attr_ns(node, &R::id()) else {
                    continue;
                };
                let part_name = resolve_rel(&rels, rel_id, &main_part)?;
                if !package.has_part(&part_name) {
                    return Err(DeckError::corrupt(&part_name, "slide master is missing"));
                }
                master_parts.push(part_name);
            }
        }

        log::debug!(
            "presentation {} has {} slides and {} masters",
            main_part,
            slides.len(),
            master_parts.len()
        );

        Ok(Self {
            package,
            file_hash,
            main_part,
            slides,
            master_parts,
            slide_size,
        })
    }

    pub fn package(&self) -> &OoxmlPackage {
        &self.package
    }

    pub fn into_package(self) -> OoxmlPackage {
        self.package
    }

    /// SHA-256 (hex) of the container bytes this package was read from.
    pub fn file_hash(&self) -> &str {
        &self.file_hash
    }

    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    pub fn main_document(&self) -> Result<XmlDocument> {
        self.package.get_xml_part(&self.main_part)
    }

    pub fn slides(&self) -> &[SlideRef] {
        &self.slides
    }

    pub fn slide_by_id(&self, slide_id: &str) -> Option<&SlideRef> {
        self.slides.iter().find(|s| s.slide_id == slide_id)
    }

    pub fn master_parts(&self) -> &[String] {
        &self.master_parts
    }

    pub fn slide_size(&self) -> SlideSize {
        self.slide_size
    }

    /// First internal target of `rel_type` from `source_part`.
    pub fn related_part(&self, source_part: &str, rel_type: &str) -> Result<Option<String>> {
        Ok(self
            .package
            .relationships(source_part)?
            .into_iter()
            .find(|r| r.has_type(rel_type) && !r.is_external())
            .map(|r| r.target))
    }

    /// All internal targets of `rel_type` from `source_part`, in relationship order.
    pub fn related_parts(&self, source_part: &str, rel_type: &str) -> Result<Vec<String>> {
        Ok(self
            .package
            .relationships(source_part)?
            .into_iter()
            .filter(|r| r.has_type(rel_type) && !r.is_external())
            .map(|r| r.target)
            .collect())
    }

    pub fn relationship_target(&self, source_part: &str, rel_id: &str) -> Result<Option<Relationship>> {
        Ok(self
            .package
            .relationships(source_part)?
            .into_iter()
            .find(|r| r.id == rel_id))
    }
}

fn check_root(doc: &XmlDocument, root: indextree::NodeId) -> Result<()> {
    let Some(name) = doc.name(root) else {
        return Err(DeckError::UnsupportedFormat {
            message: "main part has no root element".to_string(),
        });
    };
    if name.matches(P::NS, "presentation") {
        return Ok(());
    }
    let message = match name.namespace.as_deref() {
        Some(P::STRICT_NS) => "Strict OOXML presentations are not supported".to_string(),
        _ => format!("unexpected root element {}", name),
    };
    Err(DeckError::UnsupportedFormat { message })
}

fn read_slide_size(doc: &XmlDocument, root: indextree::NodeId, part: &str) -> Result<SlideSize> {
    let Some(node) = doc.first_child(root, &P::sldSz()) else {
        return Ok(SlideSize::default());
    };
    let dim = |attr: &str| -> Result<i64> {
        doc.attr(node, attr)
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v > 0)
            .ok_or_else(|| DeckError::corrupt(part, format!("p:sldSz has invalid {}", attr)))
    };
    Ok(SlideSize {
        width: dim("cx")?,
        height: dim("cy")?,
    })
}

fn resolve_rel(rels: &[Relationship], rel_id: &str, source: &str) -> Result<String> {
    rels.iter()
        .find(|r| r.id == rel_id)
        .map(|r| r.target.clone())
        .ok_or_else(|| DeckError::corrupt(source, format!("relationship {} not found", rel_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_is_reduced() {
        let wide = SlideSize {
            width: 12_192_000,
            height: 6_858_000,
        };
        assert_eq!(wide.aspect_ratio(), "16:9");
        assert_eq!(SlideSize::default().aspect_ratio(), "4:3");
    }
}
