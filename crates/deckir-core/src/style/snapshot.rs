//! Immutable snapshots of the theme, master and layout parts, loaded once per
//! extraction and shared read-only by every slide.

use super::props::ListStyle;
use crate::error::{DeckError, Result};
use crate::ir::PlaceholderKind;
use crate::normalize::color::{apply_transforms, read_color_child};
use crate::normalize::{ColorSpec, CoordinateSpace, RawTransform};
use crate::package::{relationship_types, PresentationPackage};
use crate::shape_tree::{find_sp_tree, placeholder_of, ShapeTree};
use crate::xml::namespaces::XMLNS;
use crate::xml::{XmlDocument, A, P};
use indextree::NodeId;

/// Stable identifier of a theme, master or layout: the part path without the
/// `ppt/` prefix and `.xml` extension.
pub fn part_id(part_name: &str) -> String {
    let trimmed = part_name.strip_prefix("ppt/").unwrap_or(part_name);
    trimmed.strip_suffix(".xml").unwrap_or(trimmed).to_string()
}

const DEFAULT_COLOR_MAP: [(&str, &str); 12] = [
    ("bg1", "lt1"),
    ("tx1", "dk1"),
    ("bg2", "lt2"),
    ("tx2", "dk2"),
    ("accent1", "accent1"),
    ("accent2", "accent2"),
    ("accent3", "accent3"),
    ("accent4", "accent4"),
    ("accent5", "accent5"),
    ("accent6", "accent6"),
    ("hlink", "hlink"),
    ("folHlink", "folHlink"),
];

/// `p:clrMap`: logical color names to theme scheme slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
    entries: Vec<(String, String)>,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_COLOR_MAP
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl ColorMap {
    pub fn from_element(doc: &XmlDocument, node: NodeId) -> Self {
        let entries = doc
            .get(node)
            .and_then(|data| data.attributes())
            .unwrap_or_default()
            .iter()
            .filter(|a| a.name.namespace.as_deref() != Some(XMLNS) && a.name.local_name != "xmlns")
            .map(|a| (a.name.local_name.clone(), a.value.clone()))
            .collect();
        Self { entries }
    }

    /// `p:clrMapOvr/a:overrideClrMapping`; `None` for `a:masterClrMapping`.
    pub fn read_override(doc: &XmlDocument, root: NodeId) -> Option<Self> {
        let ovr = doc.first_child(root, &P::clrMapOvr())?;
        let mapping = doc.first_child(ovr, &A::overrideClrMapping())?;
        Some(Self::from_element(doc, mapping))
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Scheme slot for a logical name; names that are already slots map to themselves.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeSnapshot {
    pub id: String,
    pub part_name: String,
    pub name: String,
    /// Scheme slots in document order with their colors.
    pub colors: Vec<(String, [u8; 3])>,
    pub major_font: Option<String>,
    pub minor_font: Option<String>,
    pub effect_style_count: usize,
}

impl ThemeSnapshot {
    pub fn load(pkg: &PresentationPackage, part_name: &str) -> Result<Self> {
        let doc = pkg.package().get_xml_part(part_name)?;
        let root = doc
            .root()
            .ok_or_else(|| DeckError::corrupt(part_name, "empty theme part"))?;
        let elements = doc.first_child(root, &A::themeElements());

        let mut colors = Vec::new();
        if let Some(scheme) = elements.and_then(|e| doc.first_child(e, &A::clrScheme())) {
            for slot in doc.child_elements(scheme) {
                let Some(name) = doc.name(slot) else { continue };
                match read_color_child(&doc, slot) {
                    Some(ColorSpec::Rgb { rgb, transforms }) => {
                        colors.push((name.local_name.clone(), apply_transforms(rgb, &transforms)))
                    }
                    _ => log::warn!("{}: theme color {} is not an RGB value", part_name, name.local_name),
                }
            }
        }

        let font_scheme = elements.and_then(|e| doc.first_child(e, &A::fontScheme()));
        let typeface = |which: crate::xml::XName| {
            let font = doc.first_child(font_scheme?, &which)?;
            let latin = doc.first_child(font, &A::latin())?;
            doc.attr(latin, "typeface")
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        };
        let major_font = typeface(A::majorFont());
        let minor_font = typeface(A::minorFont());

        let effect_style_count = elements
            .and_then(|e| doc.find_path(e, &[A::fmtScheme(), A::effectStyleLst()]))
            .map(|list| doc.child_elements(list).count())
            .unwrap_or(0);

        Ok(Self {
            id: part_id(part_name),
            part_name: part_name.to_string(),
            name: doc.attr(root, "name").unwrap_or_default().to_string(),
            colors,
            major_font,
            minor_font,
            effect_style_count,
        })
    }

    pub fn color(&self, slot: &str) -> Option<[u8; 3]> {
        self.colors.iter().find(|(s, _)| s == slot).map(|(_, rgb)| *rgb)
    }
}

/// A placeholder shape on a layout or master.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderSnapshot {
    pub kind: PlaceholderKind,
    pub index: Option<u32>,
    pub shape_id: String,
    pub transform: Option<RawTransform>,
    pub space: CoordinateSpace,
    pub list_style: ListStyle,
}

fn read_placeholders(doc: &XmlDocument) -> Vec<PlaceholderSnapshot> {
    let Some(sp_tree) = find_sp_tree(doc) else {
        return Vec::new();
    };
    let tree = ShapeTree::walk(doc, sp_tree);
    tree.shapes
        .iter()
        .filter_map(|shape| {
            let (kind, index) = placeholder_of(doc, shape)?;
            let list_style = doc
                .first_child(shape.node, &P::txBody())
                .and_then(|body| doc.first_child(body, &A::lstStyle()));
            Some(PlaceholderSnapshot {
                kind,
                index,
                shape_id: shape.id.clone(),
                transform: shape.transform,
                space: shape.space,
                list_style: ListStyle::from_optional(doc, list_style),
            })
        })
        .collect()
}

/// Finds the placeholder a reference inherits from: by non-zero index when one
/// matches, otherwise by inheritance kind.
pub fn match_placeholder(
    placeholders: &[PlaceholderSnapshot],
    kind: PlaceholderKind,
    index: Option<u32>,
) -> Option<&PlaceholderSnapshot> {
    if let Some(idx) = index.filter(|i| *i != 0) {
        if let Some(found) = placeholders.iter().find(|p| p.index == Some(idx)) {
            return Some(found);
        }
    }
    let wanted = kind.inheritance_kind();
    placeholders
        .iter()
        .find(|p| p.kind.inheritance_kind() == wanted)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MasterSnapshot {
    pub id: String,
    pub part_name: String,
    pub theme_id: Option<String>,
    pub color_map: ColorMap,
    pub placeholders: Vec<PlaceholderSnapshot>,
    pub title_style: ListStyle,
    pub body_style: ListStyle,
    pub other_style: ListStyle,
    pub layout_parts: Vec<String>,
}

impl MasterSnapshot {
    fn load(pkg: &PresentationPackage, part_name: &str, theme_part: Option<&str>) -> Result<Self> {
        let doc = pkg.package().get_xml_part(part_name)?;
        let root = doc
            .root()
            .ok_or_else(|| DeckError::corrupt(part_name, "empty slide master part"))?;
        if !doc.is(root, &P::sldMaster()) {
            return Err(DeckError::corrupt(part_name, "root element is not p:sldMaster"));
        }

        let color_map = match doc.first_child(root, &P::clrMap()) {
            Some(map) => ColorMap::from_element(&doc, map),
            None => {
                log::warn!("{}: no p:clrMap, using the default mapping", part_name);
                ColorMap::default()
            }
        };

        let text_styles = doc.first_child(root, &P::txStyles());
        let style = |name: crate::xml::XName| {
            ListStyle::from_optional(&doc, text_styles.and_then(|ts| doc.first_child(ts, &name)))
        };

        Ok(Self {
            id: part_id(part_name),
            part_name: part_name.to_string(),
            theme_id: theme_part.map(part_id),
            color_map,
            placeholders: read_placeholders(&doc),
            title_style: style(P::titleStyle()),
            body_style: style(P::bodyStyle()),
            other_style: style(P::otherStyle()),
            layout_parts: pkg.related_parts(part_name, relationship_types::SLIDE_LAYOUT)?,
        })
    }

    /// The `p:txStyles` entry that applies to a placeholder kind, or to
    /// non-placeholder shapes when `kind` is `None`.
    pub fn text_style(&self, kind: Option<PlaceholderKind>) -> &ListStyle {
        match kind {
            Some(k) if k.is_title() => &self.title_style,
            Some(PlaceholderKind::Date)
            | Some(PlaceholderKind::Footer)
            | Some(PlaceholderKind::SlideNumber)
            | Some(PlaceholderKind::Header)
            | None => &self.other_style,
            Some(_) => &self.body_style,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    pub id: String,
    pub part_name: String,
    pub name: String,
    pub layout_type: Option<String>,
    pub master_id: String,
    pub placeholders: Vec<PlaceholderSnapshot>,
    pub color_map_override: Option<ColorMap>,
}

impl LayoutSnapshot {
    fn load(pkg: &PresentationPackage, part_name: &str, master_id: &str) -> Result<Self> {
        let doc = pkg.package().get_xml_part(part_name)?;
        let root = doc
            .root()
            .ok_or_else(|| DeckError::corrupt(part_name, "empty slide layout part"))?;
        if !doc.is(root, &P::sldLayout()) {
            return Err(DeckError::corrupt(part_name, "root element is not p:sldLayout"));
        }
        let name = doc
            .first_child(root, &P::cSld())
            .and_then(|c| doc.attr(c, "name"))
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            id: part_id(part_name),
            part_name: part_name.to_string(),
            name,
            layout_type: doc.attr(root, "type").map(str::to_string),
            master_id: master_id.to_string(),
            placeholders: read_placeholders(&doc),
            color_map_override: ColorMap::read_override(&doc, root),
        })
    }
}

/// Every style-bearing part of a presentation.
#[derive(Debug, Clone, Default)]
pub struct StyleSnapshots {
    pub themes: Vec<ThemeSnapshot>,
    pub masters: Vec<MasterSnapshot>,
    pub layouts: Vec<LayoutSnapshot>,
    /// `p:presentation/p:defaultTextStyle`.
    pub default_text_style: ListStyle,
}

impl StyleSnapshots {
    pub fn load(pkg: &PresentationPackage) -> Result<Self> {
        let main = pkg.main_document()?;
        let default_text_style = ListStyle::from_optional(
            &main,
            main.root()
                .and_then(|root| main.first_child(root, &P::defaultTextStyle())),
        );

        let mut snapshots = StyleSnapshots {
            default_text_style,
            ..Default::default()
        };

        for master_part in pkg.master_parts() {
            let theme_part = pkg.related_part(master_part, relationship_types::THEME)?;
            if let Some(theme_part) = theme_part.as_deref() {
                if snapshots.theme_by_part(theme_part).is_none() {
                    log::debug!("loading theme {}", theme_part);
                    snapshots.themes.push(ThemeSnapshot::load(pkg, theme_part)?);
                }
            }

            log::debug!("loading slide master {}", master_part);
            let master = MasterSnapshot::load(pkg, master_part, theme_part.as_deref())?;
            for layout_part in &master.layout_parts {
                if snapshots.layout_by_part(layout_part).is_some() {
                    continue;
                }
                if !pkg.package().has_part(layout_part) {
                    return Err(DeckError::corrupt(layout_part, "slide layout is missing"));
                }
                snapshots
                    .layouts
                    .push(LayoutSnapshot::load(pkg, layout_part, &master.id)?);
            }
            snapshots.masters.push(master);
        }

        Ok(snapshots)
    }

    pub fn theme(&self, id: &str) -> Option<&ThemeSnapshot> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn theme_by_part(&self, part_name: &str) -> Option<&ThemeSnapshot> {
        self.themes.iter().find(|t| t.part_name == part_name)
    }

    pub fn master(&self, id: &str) -> Option<&MasterSnapshot> {
        self.masters.iter().find(|m| m.id == id)
    }

    pub fn master_by_part(&self, part_name: &str) -> Option<&MasterSnapshot> {
        self.masters.iter().find(|m| m.part_name == part_name)
    }

    pub fn layout_by_part(&self, part_name: &str) -> Option<&LayoutSnapshot> {
        self.layouts.iter().find(|l| l.part_name == part_name)
    }

    /// Follows slide → layout → master through the relationship graph.
    ///
    /// Every hop must land on a known part of the expected kind, no part may be
    /// visited twice, and the layout's master relationship must agree with the
    /// master that lists the layout.
    pub fn resolve_chain(
        &self,
        pkg: &PresentationPackage,
        slide_part: &str,
    ) -> Result<(&LayoutSnapshot, &MasterSnapshot)> {
        let fail = |message: String| DeckError::StyleResolutionError {
            part: slide_part.to_string(),
            message,
        };
        let mut visited = vec![slide_part.to_string()];

        let layout_part = pkg
            .related_part(slide_part, relationship_types::SLIDE_LAYOUT)?
            .ok_or_else(|| fail("slide has no slide layout relationship".to_string()))?;
        if visited.contains(&layout_part) {
            return Err(fail(format!("circular inheritance through {}", layout_part)));
        }
        visited.push(layout_part.clone());
        let layout = self
            .layout_by_part(&layout_part)
            .ok_or_else(|| fail(format!("{} is not a slide layout of any master", layout_part)))?;

        let master_part = pkg
            .related_part(&layout_part, relationship_types::SLIDE_MASTER)?
            .ok_or_else(|| fail(format!("{} has no slide master relationship", layout_part)))?;
        if visited.contains(&master_part) {
            return Err(fail(format!("circular inheritance through {}", master_part)));
        }
        let master = self
            .master_by_part(&master_part)
            .ok_or_else(|| fail(format!("{} is not a slide master", master_part)))?;
        if master.id != layout.master_id {
            return Err(fail(format!(
                "{} links to {} but is listed by {}",
                layout_part, master.id, layout.master_id
            )));
        }

        Ok((layout, master))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser;

    fn ph(kind: PlaceholderKind, index: Option<u32>, id: &str) -> PlaceholderSnapshot {
        PlaceholderSnapshot {
            kind,
            index,
            shape_id: id.to_string(),
            transform: None,
            space: CoordinateSpace::identity(),
            list_style: ListStyle::default(),
        }
    }

    #[test]
    fn part_ids_drop_prefix_and_extension() {
        assert_eq!(part_id("ppt/slideLayouts/slideLayout2.xml"), "slideLayouts/slideLayout2");
        assert_eq!(part_id("ppt/theme/theme1.xml"), "theme/theme1");
    }

    #[test]
    fn placeholder_matching_prefers_index_then_kind() {
        let placeholders = vec![
            ph(PlaceholderKind::Title, None, "2"),
            ph(PlaceholderKind::Body, Some(1), "3"),
            ph(PlaceholderKind::Body, Some(13), "4"),
        ];
        let by_index = match_placeholder(&placeholders, PlaceholderKind::Object, Some(13));
        assert_eq!(by_index.map(|p| p.shape_id.as_str()), Some("4"));

        let by_kind = match_placeholder(&placeholders, PlaceholderKind::CenteredTitle, None);
        assert_eq!(by_kind.map(|p| p.shape_id.as_str()), Some("2"));

        let subtitle = match_placeholder(&placeholders, PlaceholderKind::Subtitle, Some(99));
        assert_eq!(subtitle.map(|p| p.shape_id.as_str()), Some("3"));

        assert!(match_placeholder(&placeholders, PlaceholderKind::Footer, None).is_none());
    }

    #[test]
    fn color_map_resolves_and_overrides() {
        let doc = parser::parse(
            r#"<p:clrMap xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" bg1="dk1" tx1="lt1" bg2="dk2" tx2="lt2" accent1="accent1"/>"#,
        )
        .unwrap();
        let map = ColorMap::from_element(&doc, doc.root().unwrap());
        assert_eq!(map.resolve("tx1"), "lt1");
        assert_eq!(map.resolve("accent1"), "accent1");
        assert_eq!(map.resolve("dk2"), "dk2");
        assert_eq!(map.entries().len(), 5);

        assert_eq!(ColorMap::default().resolve("bg1"), "lt1");
    }
}
