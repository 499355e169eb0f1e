//! Pre-order traversal of a `p:spTree`.
//!
//! Extraction and regeneration both index shapes through [`ShapeTree::walk`],
//! so a shape id resolves to the same element in both directions.

use crate::ir::PlaceholderKind;
use crate::normalize::geometry::{read_child_extents, read_transform};
use crate::normalize::{CoordinateSpace, RawTransform};
use crate::xml::{XName, XmlDocument, A, MC, P};
use indextree::NodeId;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeElement {
    Shape,
    Picture,
    GraphicFrame,
    Group,
    Connector,
}

impl ShapeElement {
    fn classify(name: &XName) -> Option<Self> {
        if !name.in_namespace(P::NS) {
            return None;
        }
        match name.local_name.as_str() {
            "sp" => Some(Self::Shape),
            "pic" => Some(Self::Picture),
            "graphicFrame" => Some(Self::GraphicFrame),
            "grpSp" => Some(Self::Group),
            "cxnSp" => Some(Self::Connector),
            _ => None,
        }
    }

    fn non_visual_name(&self) -> XName {
        match self {
            Self::Shape => P::nvSpPr(),
            Self::Picture => P::nvPicPr(),
            Self::GraphicFrame => P::nvGraphicFramePr(),
            Self::Group => P::nvGrpSpPr(),
            Self::Connector => P::nvCxnSpPr(),
        }
    }

    /// Element holding the shape's properties (`p:spPr` or `p:grpSpPr`); graphic frames have none.
    pub fn properties_name(&self) -> Option<XName> {
        match self {
            Self::Shape | Self::Picture | Self::Connector => Some(P::spPr()),
            Self::Group => Some(P::grpSpPr()),
            Self::GraphicFrame => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisitedShape {
    pub node: NodeId,
    pub element: ShapeElement,
    pub id: String,
    pub name: String,
    pub c_nv_pr: NodeId,
    /// `p:nvPr`, which carries the placeholder reference.
    pub nv_pr: Option<NodeId>,
    /// Index of the enclosing group in [`ShapeTree::shapes`].
    pub parent: Option<usize>,
    pub depth: usize,
    /// Coordinate space the shape's transform is written in.
    pub space: CoordinateSpace,
    pub transform: Option<RawTransform>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedShape {
    pub shape_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ShapeTree {
    pub shapes: Vec<VisitedShape>,
    pub skipped: Vec<SkippedShape>,
}

/// `p:cSld/p:spTree` of a slide, layout or master part.
pub fn find_sp_tree(doc: &XmlDocument) -> Option<NodeId> {
    let root = doc.root()?;
    doc.find_path(root, &[P::cSld(), P::spTree()])
}

/// The transform element of a shape: `p:xfrm` for graphic frames, otherwise
/// `a:xfrm` inside the shape properties.
pub fn transform_node(doc: &XmlDocument, node: NodeId, element: ShapeElement) -> Option<NodeId> {
    match element.properties_name() {
        Some(props) => {
            let props = doc.first_child(node, &props)?;
            doc.first_child(props, &A::xfrm())
        }
        None => doc.first_child(node, &P::xfrm()),
    }
}

impl ShapeTree {
    pub fn walk(doc: &XmlDocument, sp_tree: NodeId) -> Self {
        let mut tree = ShapeTree::default();
        let mut seen_ids: HashSet<String> = HashSet::new();

        let mut stack: Vec<(NodeId, Option<usize>, CoordinateSpace, usize)> = doc
            .child_elements(sp_tree)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .map(|n| (n, None, CoordinateSpace::identity(), 0))
            .collect();

        while let Some((node, parent, space, depth)) = stack.pop() {
            let Some(name) = doc.name(node) else {
                continue;
            };

            if name == &MC::AlternateContent() {
                let branch = doc
                    .first_child(node, &MC::Choice())
                    .or_else(|| doc.first_child(node, &MC::Fallback()));
                if let Some(branch) = branch {
                    let children: Vec<NodeId> = doc.child_elements(branch).collect();
                    stack.extend(children.into_iter().rev().map(|c| (c, parent, space, depth)));
                }
                continue;
            }

            let Some(element) = ShapeElement::classify(name) else {
                continue;
            };

            let nv = doc.first_child(node, &element.non_visual_name());
            let Some(c_nv_pr) = nv.and_then(|nv| doc.first_child(nv, &P::cNvPr())) else {
                tree.skip(None, "missing non-visual properties");
                continue;
            };

            let Some(id) = doc.attr(c_nv_pr, "id").map(str::trim) else {
                tree.skip(None, "missing shape id");
                continue;
            };
            if id.parse::<u32>().is_err() {
                tree.skip(Some(id), "non-numeric shape id");
                continue;
            }
            if seen_ids.contains(id) {
                tree.skip(Some(id), "duplicate shape id");
                continue;
            }

            let xfrm = transform_node(doc, node, element);
            let transform = match read_transform(doc, xfrm) {
                Ok(t) => t,
                Err(reason) => {
                    tree.skip(Some(id), &format!("unparseable transform: {}", reason));
                    continue;
                }
            };

            let child_space = match (element, xfrm, transform.as_ref()) {
                (ShapeElement::Group, Some(xfrm), Some(own)) => {
                    match read_child_extents(doc, xfrm, own) {
                        Ok(child) => Some(space.enter_group(own, &child)),
                        Err(reason) => {
                            tree.skip(Some(id), &format!("unparseable group transform: {}", reason));
                            continue;
                        }
                    }
                }
                (ShapeElement::Group, _, _) => Some(space),
                _ => None,
            };

            seen_ids.insert(id.to_string());
            let index = tree.shapes.len();
            tree.shapes.push(VisitedShape {
                node,
                element,
                id: id.to_string(),
                name: doc.attr(c_nv_pr, "name").unwrap_or_default().to_string(),
                c_nv_pr,
                nv_pr: nv.and_then(|nv| doc.first_child(nv, &P::nvPr())),
                parent,
                depth,
                space,
                transform,
            });

            if let Some(child_space) = child_space {
                let children: Vec<NodeId> = doc.child_elements(node).collect();
                stack.extend(
                    children
                        .into_iter()
                        .rev()
                        .map(|c| (c, Some(index), child_space, depth + 1)),
                );
            }
        }

        tree
    }

    fn skip(&mut self, shape_id: Option<&str>, reason: &str) {
        log::warn!(
            "skipping shape {}: {}",
            shape_id.unwrap_or("<unknown>"),
            reason
        );
        self.skipped.push(SkippedShape {
            shape_id: shape_id.map(str::to_string),
            reason: reason.to_string(),
        });
    }

    pub fn index_by_id(&self) -> HashMap<&str, usize> {
        self.shapes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&VisitedShape> {
        self.shapes.iter().find(|s| s.id == id)
    }
}

/// Placeholder reference of a visited shape, from `p:nvPr/p:ph`.
pub fn placeholder_of(doc: &XmlDocument, shape: &VisitedShape) -> Option<(PlaceholderKind, Option<u32>)> {
    let ph = doc.first_child(shape.nv_pr?, &P::ph())?;
    let kind = PlaceholderKind::from_xml(doc.attr(ph, "type"));
    let index = doc.attr(ph, "idx").and_then(|v| v.trim().parse::<u32>().ok());
    Some((kind, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser;

    fn slide(sp_tree_body: &str) -> XmlDocument {
        let xml = format!(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
            sp_tree_body
        );
        parser::parse(&xml).unwrap()
    }

    fn sp(id: &str) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Shape {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr></p:sp>"#
        )
    }

    fn ids(tree: &ShapeTree) -> Vec<&str> {
        tree.shapes.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn walk_is_preorder_through_groups() {
        let group = format!(
            r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="10" name="Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="200" cy="200"/><a:chOff x="0" y="0"/><a:chExt cx="100" cy="100"/></a:xfrm></p:grpSpPr>{}{}</p:grpSp>"#,
            sp("11"),
            sp("12")
        );
        let doc = slide(&format!("{}{}{}", sp("2"), group, sp("3")));
        let tree = ShapeTree::walk(&doc, find_sp_tree(&doc).unwrap());

        assert_eq!(ids(&tree), vec!["2", "10", "11", "12", "3"]);
        assert_eq!(tree.shapes[2].parent, Some(1));
        assert_eq!(tree.shapes[2].depth, 1);
        assert_eq!(tree.shapes[2].space.scale_x, 2.0);
        assert!(tree.skipped.is_empty());
    }

    #[test]
    fn duplicate_and_malformed_shapes_are_skipped() {
        let no_nv = r#"<p:sp><p:spPr/></p:sp>"#;
        let bad_id = r#"<p:sp><p:nvSpPr><p:cNvPr id="abc" name="x"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#;
        let doc = slide(&format!("{}{}{}{}", sp("2"), no_nv, bad_id, sp("2")));
        let tree = ShapeTree::walk(&doc, find_sp_tree(&doc).unwrap());

        assert_eq!(ids(&tree), vec!["2"]);
        let reasons: Vec<&str> = tree.skipped.iter().map(|s| s.reason.as_str()).collect();
        assert_eq!(
            reasons,
            vec!["missing non-visual properties", "non-numeric shape id", "duplicate shape id"]
        );
    }

    #[test]
    fn alternate_content_uses_choice_branch() {
        let alt = format!(
            r#"<mc:AlternateContent><mc:Choice Requires="p14">{}</mc:Choice><mc:Fallback>{}</mc:Fallback></mc:AlternateContent>"#,
            sp("20"),
            sp("21")
        );
        let doc = slide(&alt);
        let tree = ShapeTree::walk(&doc, find_sp_tree(&doc).unwrap());
        assert_eq!(ids(&tree), vec!["20"]);
    }

    #[test]
    fn placeholder_reference_is_read() {
        let ph = r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="Body"/><p:cNvSpPr/><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr/></p:sp>"#;
        let doc = slide(ph);
        let tree = ShapeTree::walk(&doc, find_sp_tree(&doc).unwrap());
        let shape = &tree.shapes[0];
        assert_eq!(placeholder_of(&doc, shape), Some((PlaceholderKind::Body, Some(1))));
        assert!(shape.transform.is_none());
    }
}
