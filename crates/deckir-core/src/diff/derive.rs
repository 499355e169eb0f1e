//! Diffs computed from a modified copy of an extracted document.

use super::builder::DiffBuilder;
use super::types::{Diff, EditField, EditValue, RunIndex};
use crate::error::Result;
use crate::ir::{Document, Fill, FormattingRecord, RunKind, Shape, ShapeKey, ShapeKind, TextFrame};
use crate::normalize::ColorValue;

const BOUNDS_TOLERANCE: f64 = 1e-9;

/// Records the edits that turn `original` into `modified`.
///
/// Shapes are matched by slide id and shape id. Shapes that exist on only one
/// side are ignored: a diff changes properties, it never adds or removes shapes.
pub fn derive_diff(original: &Document, modified: &Document) -> Result<Diff> {
    let mut builder = DiffBuilder::new(original);

    for slide in original.slides() {
        let Some(modified_slide) = modified.slide(&slide.id) else {
            log::warn!("slide {} is missing from the modified document", slide.id);
            continue;
        };
        for shape in slide.shapes_preorder() {
            let Some(changed) = modified_slide.find_shape(&shape.id) else {
                log::debug!("shape {}/{} was removed; not recorded", slide.id, shape.id);
                continue;
            };
            let key = ShapeKey::new(slide.id.clone(), shape.id.clone());
            for (field, value) in shape_changes(shape, changed) {
                builder.record_edit(key.clone(), field, value)?;
            }
        }
        for shape in modified_slide.shapes_preorder() {
            if slide.find_shape(&shape.id).is_none() {
                log::warn!("shape {}/{} is new and cannot be expressed as an edit", slide.id, shape.id);
            }
        }
    }

    Ok(builder.finalize())
}

fn shape_changes(original: &Shape, modified: &Shape) -> Vec<(EditField, EditValue)> {
    let mut changes = Vec::new();

    if original.alt_text != modified.alt_text {
        changes.push((
            EditField::AltText,
            EditValue::Text(modified.alt_text.clone().unwrap_or_default()),
        ));
    }

    if let Some(bounds) = modified.bounds {
        let moved = match original.bounds {
            Some(before) => !before.approx_eq(&bounds, BOUNDS_TOLERANCE),
            None => true,
        };
        if moved {
            changes.push((EditField::Bounds, EditValue::Bounds(bounds)));
        }
    }

    if let (ShapeKind::Text(before), ShapeKind::Text(after)) = (&original.kind, &modified.kind) {
        if let Fill::Solid { color } = &after.fill {
            let unchanged = matches!(
                &before.fill,
                Fill::Solid { color: old } if same_color(old, color)
            );
            if !unchanged {
                changes.push((EditField::FillColor, EditValue::Color(color.clone())));
            }
        }
        if let (Some(before), Some(after)) = (&before.text_frame, &after.text_frame) {
            changes.extend(text_changes(before, after));
        }
    }

    changes
}

fn same_color(a: &ColorValue, b: &ColorValue) -> bool {
    a.rgb() == b.rgb() && a.source() == b.source()
}

fn same_structure(a: &TextFrame, b: &TextFrame) -> bool {
    a.paragraphs.len() == b.paragraphs.len()
        && a.paragraphs.iter().zip(&b.paragraphs).all(|(pa, pb)| {
            pa.runs.len() == pb.runs.len()
                && pa.runs.iter().zip(&pb.runs).all(|(ra, rb)| ra.kind == rb.kind)
        })
}

/// Per-run edits when the paragraph and run structure is unchanged, otherwise
/// a whole-text replacement.
fn text_changes(before: &TextFrame, after: &TextFrame) -> Vec<(EditField, EditValue)> {
    if !same_structure(before, after) {
        let text = after.plain_text();
        return if text != before.plain_text() {
            vec![(EditField::Text, EditValue::Text(text))]
        } else {
            Vec::new()
        };
    }

    let mut changes = Vec::new();
    for (p, (pa, pb)) in before.paragraphs.iter().zip(&after.paragraphs).enumerate() {
        for (r, (ra, rb)) in pa.runs.iter().zip(&pb.runs).enumerate() {
            if rb.kind == RunKind::Break {
                continue;
            }
            if ra.text != rb.text {
                changes.push((
                    EditField::RunText { paragraph: p, run: r },
                    EditValue::Text(rb.text.clone()),
                ));
            }
            changes.extend(formatting_changes(&ra.formatting, &rb.formatting, RunIndex::new(p, r)));
        }
    }
    changes
}

fn formatting_changes(a: &FormattingRecord, b: &FormattingRecord, index: RunIndex) -> Vec<(EditField, EditValue)> {
    let run = Some(index);
    let mut changes = Vec::new();
    if a.font_family != b.font_family {
        changes.push((EditField::FontFamily { run }, EditValue::Text(b.font_family.clone())));
    }
    if (a.font_size - b.font_size).abs() > f64::EPSILON {
        changes.push((EditField::FontSize { run }, EditValue::Number(b.font_size)));
    }
    if a.bold != b.bold {
        changes.push((EditField::Bold { run }, EditValue::Flag(b.bold)));
    }
    if a.italic != b.italic {
        changes.push((EditField::Italic { run }, EditValue::Flag(b.italic)));
    }
    if a.underline != b.underline {
        changes.push((EditField::Underline { run }, EditValue::Flag(b.underline)));
    }
    if !same_color(&a.color, &b.color) {
        changes.push((EditField::FontColor { run }, EditValue::Color(b.color.clone())));
    }
    changes
}
