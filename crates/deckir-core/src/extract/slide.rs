use super::shapes::ShapeContext;
use super::stats::slide_statistics;
use crate::error::{DeckError, Result};
use crate::hash::content_hash;
use crate::ir::{
    Background, ImageShape, Shape, ShapeExtractionWarning, ShapeKind, Slide, SlideRole,
};
use crate::normalize::color::read_color_child;
use crate::package::{relationship_types, PresentationPackage, SlideRef};
use crate::settings::ExtractionSettings;
use crate::shape_tree::{find_sp_tree, ShapeTree};
use crate::style::{ColorMap, SlideStyle, StyleSnapshots};
use crate::xml::{XmlDocument, A, P};
use indextree::NodeId;

/// Extracts one slide. `index` is the 1-based presentation position.
pub(crate) fn extract_slide(
    pkg: &PresentationPackage,
    snapshots: &StyleSnapshots,
    settings: &ExtractionSettings,
    slide_ref: &SlideRef,
    index: usize,
) -> Result<(Slide, Vec<ShapeExtractionWarning>)> {
    let part_name = slide_ref.part_name.as_str();
    log::debug!("extracting slide {} ({})", slide_ref.slide_id, part_name);

    let bytes = pkg
        .package()
        .get_part(part_name)
        .ok_or_else(|| DeckError::corrupt(part_name, "slide part is missing"))?;
    let hash = content_hash(bytes);
    let doc = pkg.package().get_xml_part(part_name)?;
    let root = doc
        .root()
        .ok_or_else(|| DeckError::corrupt(part_name, "slide has no root element"))?;

    let (layout, master) = snapshots.resolve_chain(pkg, part_name)?;
    let style = SlideStyle::new(
        &settings.cascade_policy,
        snapshots,
        layout,
        master,
        ColorMap::read_override(&doc, root),
    );

    let tree = match find_sp_tree(&doc) {
        Some(sp_tree) => ShapeTree::walk(&doc, sp_tree),
        None => ShapeTree::default(),
    };
    let warnings = tree
        .skipped
        .iter()
        .map(|skip| ShapeExtractionWarning {
            slide_id: slide_ref.slide_id.clone(),
            part_name: part_name.to_string(),
            shape_id: skip.shape_id.clone(),
            reason: skip.reason.clone(),
        })
        .collect();

    let context = ShapeContext {
        pkg,
        doc: &doc,
        part_name,
        style: &style,
        slide_size: pkg.slide_size(),
        include_table_cells: settings.include_table_cells,
    };
    let shapes = assemble(&tree, |i, visited| context.build(visited, i));

    let slide = Slide {
        id: slide_ref.slide_id.clone(),
        index,
        part_name: part_name.to_string(),
        layout_id: layout.id.clone(),
        hidden: doc.attr(root, "show") == Some("0"),
        has_notes: pkg
            .related_part(part_name, relationship_types::NOTES_SLIDE)?
            .is_some(),
        transition: read_transition(&doc, root),
        background: read_background(&doc, root, &style),
        role: slide_role(index, &shapes),
        content_hash: hash,
        statistics: slide_statistics(&shapes, settings.color_merge_delta_e),
        shapes,
    };
    Ok((slide, warnings))
}

/// Rebuilds the group hierarchy from the flat pre-order walk.
///
/// Children always follow their parent in the walk, so visiting indices in
/// reverse lets every shape move into a parent that has not been consumed yet.
fn assemble(
    tree: &ShapeTree,
    build: impl Fn(usize, &crate::shape_tree::VisitedShape) -> Shape,
) -> Vec<Shape> {
    let mut built: Vec<Option<Shape>> = tree
        .shapes
        .iter()
        .enumerate()
        .map(|(i, visited)| Some(build(i, visited)))
        .collect();
    let mut roots = Vec::new();

    for i in (0..built.len()).rev() {
        let Some(mut shape) = built[i].take() else {
            continue;
        };
        if let ShapeKind::Group(group) = &mut shape.kind {
            group.children.reverse();
        }
        match tree.shapes[i].parent.and_then(|p| built[p].as_mut()) {
            Some(parent) => {
                if let ShapeKind::Group(group) = &mut parent.kind {
                    group.children.push(shape);
                }
            }
            None => roots.push(shape),
        }
    }

    roots.reverse();
    roots
}

fn read_transition(doc: &XmlDocument, root: NodeId) -> Option<String> {
    let transition = doc.descendants_by_name(root, &P::transition()).next()?;
    doc.child_elements(transition)
        .filter_map(|child| doc.name(child))
        .map(|name| name.local_name.clone())
        .next()
        .or_else(|| doc.attr(transition, "spd").map(str::to_string))
}

fn read_background(doc: &XmlDocument, root: NodeId, style: &SlideStyle<'_>) -> Background {
    let Some(bg) = doc.find_path(root, &[P::cSld(), P::bg()]) else {
        return Background::None;
    };

    if let Some(bg_pr) = doc.first_child(bg, &P::bgPr()) {
        for child in doc.child_elements(bg_pr) {
            let Some(name) = doc.name(child) else { continue };
            if !name.in_namespace(A::NS) {
                continue;
            }
            match name.local_name.as_str() {
                "solidFill" => {
                    if let Some(spec) = read_color_child(doc, child) {
                        return Background::Solid {
                            color: style.resolve_color(&spec),
                        };
                    }
                }
                "gradFill" => return Background::Gradient,
                "blipFill" => return Background::Image,
                "noFill" => return Background::None,
                _ => {}
            }
        }
        return Background::None;
    }

    doc.first_child(bg, &P::bgRef())
        .and_then(|bg_ref| read_color_child(doc, bg_ref))
        .map(|spec| Background::Solid {
            color: style.resolve_color(&spec),
        })
        .unwrap_or_default()
}

fn slide_role(index: usize, shapes: &[Shape]) -> SlideRole {
    if index == 1 {
        return SlideRole::TitleSlide;
    }

    let mut has_table = false;
    let mut pictures = 0;
    let mut stack: Vec<&Shape> = shapes.iter().collect();
    while let Some(shape) = stack.pop() {
        stack.extend(shape.children());
        match &shape.kind {
            ShapeKind::Chart(_) => return SlideRole::DataVisualization,
            ShapeKind::Table(_) => has_table = true,
            ShapeKind::Image(ImageShape::Picture { .. }) => pictures += 1,
            _ => {}
        }
    }

    if has_table {
        SlideRole::TableContent
    } else if pictures > 2 {
        SlideRole::ImageGallery
    } else {
        SlideRole::Content
    }
}
