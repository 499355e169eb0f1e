//! In-place application of single edits to a parsed slide part.
//!
//! Every function takes the shape element located by the shared shape-tree
//! walk and returns `Err(reason)` when the source no longer has the structure
//! the edit needs. Elements are created at their schema position.

use crate::diff::{Edit, EditField, EditValue, RunIndex};
use crate::normalize::{denormalize, Bounds, ColorSource, ColorValue};
use crate::package::SlideSize;
use crate::shape_tree::{transform_node, ShapeElement, VisitedShape};
use crate::xml::{XName, XmlDocument, XmlNodeData, A, P};
use indextree::NodeId;

pub(crate) type ApplyResult = std::result::Result<(), String>;

/// `a:rPr` child sequence.
const RPR_ORDER: &[&str] = &[
    "ln", "noFill", "solidFill", "gradFill", "blipFill", "pattFill", "grpFill", "effectLst",
    "effectDag", "highlight", "uLnTx", "uLn", "uFillTx", "uFill", "latin", "ea", "cs", "sym",
    "hlinkClick", "hlinkMouseOver", "rtl", "extLst",
];

/// `p:spPr` / `p:grpSpPr` child sequence.
const SPPR_ORDER: &[&str] = &[
    "xfrm", "custGeom", "prstGeom", "noFill", "solidFill", "gradFill", "blipFill", "pattFill",
    "grpFill", "ln", "effectLst", "effectDag", "scene3d", "sp3d", "extLst",
];

const RUN_ORDER: &[&str] = &["rPr", "pPr", "t"];
const XFRM_ORDER: &[&str] = &["off", "ext", "chOff", "chExt"];
/// Child sequence of `p:sp`, `p:pic`, `p:cxnSp`, `p:grpSp` and `p:graphicFrame` combined.
const SHAPE_ORDER: &[&str] = &[
    "nvSpPr", "nvPicPr", "nvCxnSpPr", "nvGrpSpPr", "nvGraphicFramePr", "blipFill", "spPr", "grpSpPr",
    "xfrm", "graphic", "style", "txBody", "sp", "grpSp", "graphicFrame", "cxnSp", "pic",
    "contentPart", "extLst",
];
const FILL_NAMES: &[&str] = &["noFill", "solidFill", "gradFill", "blipFill", "pattFill", "grpFill"];

pub(crate) fn apply_edit(
    doc: &mut XmlDocument,
    shape: &VisitedShape,
    edit: &Edit,
    slide_size: SlideSize,
) -> ApplyResult {
    match (&edit.field, &edit.value) {
        (EditField::Text, EditValue::Text(text)) => set_text(doc, shape.node, text),
        (EditField::RunText { paragraph, run }, EditValue::Text(text)) => {
            let run = locate_run(doc, shape.node, RunIndex::new(*paragraph, *run))?;
            set_run_text(doc, run, text);
            Ok(())
        }
        (EditField::AltText, EditValue::Text(text)) => {
            if text.is_empty() {
                doc.remove_attribute(shape.c_nv_pr, &XName::local("descr"));
            } else {
                doc.set_attribute(shape.c_nv_pr, &XName::local("descr"), text);
            }
            Ok(())
        }
        (EditField::FillColor, EditValue::Color(color)) => {
            let sp_pr = doc
                .first_child(shape.node, &P::spPr())
                .ok_or_else(|| "shape has no shape properties".to_string())?;
            replace_fill(doc, sp_pr, color, SPPR_ORDER);
            Ok(())
        }
        (EditField::Bounds, EditValue::Bounds(bounds)) => set_bounds(doc, shape, bounds, slide_size),
        (field, value) if field.is_run_formatting() => {
            let runs = match field.run_index() {
                Some(index) => vec![locate_run(doc, shape.node, index)?],
                None => all_runs(doc, shape.node)?,
            };
            for run in runs {
                let rpr = doc.ensure_child(run, &A::rPr(), RUN_ORDER);
                apply_run_property(doc, rpr, field, value);
            }
            Ok(())
        }
        (field, value) => Err(format!("{} cannot take a {} value", field, value.kind())),
    }
}

fn text_body(doc: &XmlDocument, shape: NodeId) -> std::result::Result<NodeId, String> {
    doc.first_child(shape, &P::txBody())
        .ok_or_else(|| "shape has no text body".to_string())
}

/// Runs in extraction order: `a:r`, `a:br` and `a:fld` children of each `a:p`.
fn paragraph_runs(doc: &XmlDocument, paragraph: NodeId) -> Vec<NodeId> {
    doc.child_elements(paragraph)
        .filter(|&child| {
            doc.name(child)
                .map(|n| n.is_one_of(A::NS, &["r", "br", "fld"]))
                .unwrap_or(false)
        })
        .collect()
}

fn locate_run(doc: &XmlDocument, shape: NodeId, index: RunIndex) -> std::result::Result<NodeId, String> {
    let body = text_body(doc, shape)?;
    let paragraph = doc
        .elements_by_name(body, &A::p())
        .nth(index.paragraph)
        .ok_or_else(|| format!("paragraph {} not found", index.paragraph))?;
    let run = paragraph_runs(doc, paragraph)
        .get(index.run)
        .copied()
        .ok_or_else(|| format!("run {} of paragraph {} not found", index.run, index.paragraph))?;
    if doc.is(run, &A::br()) {
        return Err(format!("run {} of paragraph {} is a line break", index.run, index.paragraph));
    }
    Ok(run)
}

fn all_runs(doc: &XmlDocument, shape: NodeId) -> std::result::Result<Vec<NodeId>, String> {
    let body = text_body(doc, shape)?;
    Ok(doc
        .elements_by_name(body, &A::p())
        .flat_map(|p| paragraph_runs(doc, p))
        .filter(|&run| !doc.is(run, &A::br()))
        .collect())
}

fn set_run_text(doc: &mut XmlDocument, run: NodeId, text: &str) {
    let t = doc.ensure_child(run, &A::t(), RUN_ORDER);
    let old: Vec<NodeId> = doc.children(t).collect();
    for child in old {
        doc.remove(child);
    }
    if !text.is_empty() {
        doc.add_child(t, XmlNodeData::text(text));
    }
}

/// Replaces every paragraph with one per line, keeping the first paragraph's
/// `a:pPr` and a run-properties template so formatting survives.
fn set_text(doc: &mut XmlDocument, shape: NodeId, text: &str) -> ApplyResult {
    let body = text_body(doc, shape)?;
    let paragraphs: Vec<NodeId> = doc.elements_by_name(body, &A::p()).collect();

    let ppr_template = paragraphs.first().and_then(|&p| doc.first_child(p, &A::pPr()));
    let end_template = paragraphs
        .iter()
        .find_map(|&p| doc.first_child(p, &A::endParaRPr()));
    let rpr_template = run_properties_template(doc, &paragraphs).or(end_template);

    let mut new_paragraphs = Vec::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let p = doc.add_child(body, XmlNodeData::element(A::p()));
        if let Some(ppr) = ppr_template.and_then(|t| doc.deep_clone(t)) {
            doc.append_existing(p, ppr);
        }
        if !line.is_empty() {
            let r = doc.add_child(p, XmlNodeData::element(A::r()));
            if let Some(rpr) = rpr_template.and_then(|t| doc.deep_clone(t)) {
                if let Some(data) = doc.get_mut(rpr) {
                    data.rename(A::rPr());
                }
                doc.append_existing(r, rpr);
            }
            let t = doc.add_child(r, XmlNodeData::element(A::t()));
            doc.add_child(t, XmlNodeData::text(line));
        }
        if let Some(end) = end_template.and_then(|t| doc.deep_clone(t)) {
            doc.append_existing(p, end);
        }
        new_paragraphs.push(p);
    }

    for p in paragraphs {
        doc.remove(p);
    }
    log::debug!("replaced text body with {} paragraphs", new_paragraphs.len());
    Ok(())
}

/// `a:rPr` of the first run or field in document order that carries one.
fn run_properties_template(doc: &XmlDocument, paragraphs: &[NodeId]) -> Option<NodeId> {
    for &paragraph in paragraphs {
        for child in doc.child_elements(paragraph) {
            let is_run = doc
                .name(child)
                .map(|n| n.is_one_of(A::NS, &["r", "fld"]))
                .unwrap_or(false);
            if let Some(rpr) = is_run.then(|| doc.first_child(child, &A::rPr())).flatten() {
                return Some(rpr);
            }
        }
    }
    None
}

fn bool_val(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn apply_run_property(doc: &mut XmlDocument, rpr: NodeId, field: &EditField, value: &EditValue) {
    match (field, value) {
        (EditField::FontFamily { .. }, EditValue::Text(face)) => {
            let latin = doc.ensure_child(rpr, &A::latin(), RPR_ORDER);
            doc.set_attribute(latin, &XName::local("typeface"), face);
        }
        (EditField::FontSize { .. }, EditValue::Number(points)) => {
            let hundredths = (points * 100.0).round() as i64;
            doc.set_attribute(rpr, &XName::local("sz"), &hundredths.to_string());
        }
        (EditField::Bold { .. }, EditValue::Flag(on)) => {
            doc.set_attribute(rpr, &XName::local("b"), bool_val(*on));
        }
        (EditField::Italic { .. }, EditValue::Flag(on)) => {
            doc.set_attribute(rpr, &XName::local("i"), bool_val(*on));
        }
        (EditField::Underline { .. }, EditValue::Flag(on)) => {
            doc.set_attribute(rpr, &XName::local("u"), if *on { "sng" } else { "none" });
        }
        (EditField::FontColor { .. }, EditValue::Color(color)) => {
            replace_fill(doc, rpr, color, RPR_ORDER);
        }
        _ => {}
    }
}

/// Swaps whatever fill `parent` has for an `a:solidFill` of `color`.
fn replace_fill(doc: &mut XmlDocument, parent: NodeId, color: &ColorValue, order: &[&str]) {
    let existing: Vec<NodeId> = doc
        .child_elements(parent)
        .filter(|&child| {
            doc.name(child)
                .map(|n| n.is_one_of(A::NS, FILL_NAMES))
                .unwrap_or(false)
        })
        .collect();
    for node in existing {
        doc.remove(node);
    }

    let fill = doc.insert_in_order(parent, XmlNodeData::element(A::solidFill()), order);
    write_color(doc, fill, color);
}

/// Writes the color choice element: the theme slot for theme references,
/// otherwise the cached RGB. Transforms are written back as child elements.
pub(crate) fn write_color(doc: &mut XmlDocument, parent: NodeId, color: &ColorValue) {
    let (name, val) = match color.source() {
        ColorSource::ThemeReference { slot, .. } => (A::schemeClr(), slot.clone()),
        ColorSource::RawHex { hex } => (A::srgbClr(), hex.clone()),
    };
    let node = doc.add_child(parent, XmlNodeData::element(name));
    doc.set_attribute(node, &XName::local("val"), &val);
    for transform in color.transforms() {
        let child = doc.add_child(
            node,
            XmlNodeData::element(XName::new(A::NS, transform.element_name())),
        );
        doc.set_attribute(child, &XName::local("val"), &transform.value().to_string());
    }
}

fn set_bounds(doc: &mut XmlDocument, shape: &VisitedShape, bounds: &Bounds, slide_size: SlideSize) -> ApplyResult {
    if !shape.space.is_invertible() {
        return Err("an enclosing group has zero extent".to_string());
    }
    let raw = denormalize(bounds, &shape.space, slide_size);

    let xfrm = match transform_node(doc, shape.node, shape.element) {
        Some(xfrm) => xfrm,
        None => match shape.element.properties_name() {
            Some(props_name) => {
                let props = doc.ensure_child(shape.node, &props_name, SHAPE_ORDER);
                doc.ensure_child(props, &A::xfrm(), SPPR_ORDER)
            }
            None => doc.ensure_child(shape.node, &P::xfrm(), SHAPE_ORDER),
        },
    };

    let off = doc.ensure_child(xfrm, &A::off(), XFRM_ORDER);
    doc.set_attribute(off, &XName::local("x"), &raw.x.to_string());
    doc.set_attribute(off, &XName::local("y"), &raw.y.to_string());
    let ext = doc.ensure_child(xfrm, &A::ext(), XFRM_ORDER);
    doc.set_attribute(ext, &XName::local("cx"), &raw.cx.to_string());
    doc.set_attribute(ext, &XName::local("cy"), &raw.cy.to_string());

    if raw.rot != 0 {
        doc.set_attribute(xfrm, &XName::local("rot"), &raw.rot.to_string());
    } else {
        doc.remove_attribute(xfrm, &XName::local("rot"));
    }
    for (attr, on) in [("flipH", raw.flip_h), ("flipV", raw.flip_v)] {
        if on {
            doc.set_attribute(xfrm, &XName::local(attr), "1");
        } else {
            doc.remove_attribute(xfrm, &XName::local(attr));
        }
    }

    if shape.element == ShapeElement::Group && doc.first_child(xfrm, &A::chExt()).is_none() {
        log::debug!("group {} has no child extents; children follow the new frame", shape.id);
    }
    Ok(())
}
