use super::types::{Diff, Edit, EditField, EditValue, RunIndex, ShapeEdits};
use crate::error::{DeckError, Result};
use crate::ir::{Document, RunKind, Shape, ShapeKey, ShapeKind, TextFrame};

/// Records edits against one [`Document`], validating each as it arrives.
///
/// The builder only reads the document; nothing touches the package until
/// the finished [`Diff`] is handed to the regenerator.
#[derive(Debug)]
pub struct DiffBuilder<'d> {
    document: &'d Document,
    shapes: Vec<ShapeEdits>,
}

impl<'d> DiffBuilder<'d> {
    pub fn new(document: &'d Document) -> Self {
        Self {
            document,
            shapes: Vec::new(),
        }
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    /// Records one edit. A second edit of the same field and run replaces the first.
    pub fn record_edit(&mut self, key: ShapeKey, field: EditField, value: EditValue) -> Result<()> {
        let shape = self
            .document
            .shape(&key)
            .ok_or_else(|| DeckError::UnknownShapeReference {
                slide: key.slide_id.clone(),
                shape: key.shape_id.clone(),
            })?;
        validate_edit(shape, &field, &value)?;

        let edit = Edit { field, value };
        match self.shapes.iter_mut().find(|s| s.key == key) {
            Some(entry) => match entry.edits.iter_mut().find(|e| e.field == edit.field) {
                Some(existing) => *existing = edit,
                None => entry.edits.push(edit),
            },
            None => self.shapes.push(ShapeEdits {
                key,
                edits: vec![edit],
            }),
        }
        Ok(())
    }

    pub fn finalize(self) -> Diff {
        Diff {
            base_file_hash: self.document.metadata.file_hash.clone(),
            shapes: self.shapes,
        }
    }
}

impl Diff {
    /// Replays every edit through a [`DiffBuilder`] for `document`.
    pub fn validate(&self, document: &Document) -> Result<()> {
        let mut builder = DiffBuilder::new(document);
        for shape in &self.shapes {
            for edit in &shape.edits {
                builder.record_edit(shape.key.clone(), edit.field, edit.value.clone())?;
            }
        }
        Ok(())
    }
}

fn invalid(shape: &Shape, message: impl Into<String>) -> DeckError {
    DeckError::InvalidEdit {
        shape: shape.id.clone(),
        message: message.into(),
    }
}

fn validate_edit(shape: &Shape, field: &EditField, value: &EditValue) -> Result<()> {
    if field.expected_value() != value.kind() {
        return Err(invalid(
            shape,
            format!(
                "{} expects a {} value, got {}",
                field,
                field.expected_value(),
                value.kind()
            ),
        ));
    }

    match value {
        EditValue::Number(size) if !size.is_finite() || *size <= 0.0 => {
            return Err(invalid(shape, format!("font size must be positive, got {}", size)));
        }
        EditValue::Bounds(bounds) if !bounds.is_finite() || bounds.width < 0.0 || bounds.height < 0.0 => {
            return Err(invalid(shape, "bounds must be finite with non-negative size"));
        }
        EditValue::Text(text) if matches!(field, EditField::FontFamily { .. }) && text.trim().is_empty() => {
            return Err(invalid(shape, "font family must not be empty"));
        }
        _ => {}
    }

    match field {
        EditField::AltText | EditField::Bounds => Ok(()),
        EditField::FillColor => match &shape.kind {
            ShapeKind::Text(text) if !text.connector => Ok(()),
            other => Err(invalid(shape, format!("fillColor does not apply to a {} shape", other.name()))),
        },
        EditField::Text => text_frame(shape, field).map(|_| ()),
        _ => {
            let frame = text_frame(shape, field)?;
            match field.run_index() {
                Some(index) => check_run(shape, frame, index, field),
                None => Ok(()),
            }
        }
    }
}

fn text_frame<'s>(shape: &'s Shape, field: &EditField) -> Result<&'s TextFrame> {
    match &shape.kind {
        ShapeKind::Text(text) => text
            .text_frame
            .as_ref()
            .ok_or_else(|| invalid(shape, format!("{} needs a text body", field))),
        other => Err(invalid(shape, format!("{} does not apply to a {} shape", field, other.name()))),
    }
}

fn check_run(shape: &Shape, frame: &TextFrame, index: RunIndex, field: &EditField) -> Result<()> {
    let run = frame
        .run(index.paragraph, index.run)
        .ok_or_else(|| invalid(shape, format!("{} is out of range", field)))?;
    if run.kind == RunKind::Break {
        return Err(invalid(shape, format!("{} targets a line break", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;
    use crate::normalize::{Bounds, ColorValue};
    use crate::package::SlideSize;
    use crate::style::CascadeLevel;

    fn run(text: &str, kind: RunKind) -> Run {
        Run {
            text: text.to_string(),
            kind,
            formatting: FormattingRecord {
                font_family: "Calibri".into(),
                font_size: 18.0,
                color: ColorValue::black(),
                bold: false,
                italic: false,
                underline: false,
            },
            provenance: RunProvenance {
                font_family: CascadeLevel::HardDefault,
                font_size: CascadeLevel::HardDefault,
                color: CascadeLevel::HardDefault,
                bold: CascadeLevel::HardDefault,
                italic: CascadeLevel::HardDefault,
                underline: CascadeLevel::HardDefault,
            },
        }
    }

    fn shape(id: &str, kind: ShapeKind) -> Shape {
        Shape {
            id: id.to_string(),
            name: id.to_string(),
            bounds: None,
            geometry_source: GeometrySource::None,
            role: ShapeRole::Unspecified,
            placeholder: None,
            alt_text: None,
            z_order: 0,
            kind,
        }
    }

    fn document() -> Document {
        let title = shape(
            "2",
            ShapeKind::Text(TextShape {
                text_frame: Some(TextFrame {
                    paragraphs: vec![Paragraph {
                        runs: vec![run("Q3", RunKind::Text), run("\n", RunKind::Break)],
                        alignment: Alignment::Left,
                        level: 0,
                        bullet: Bullet::None,
                        line_spacing: None,
                        space_before: None,
                        space_after: None,
                    }],
                }),
                fill: Fill::Default,
                stroke: None,
                connector: false,
            }),
        );
        let picture = shape(
            "3",
            ShapeKind::Image(ImageShape::Picture {
                media_part: None,
                media_type: None,
            }),
        );
        Document {
            metadata: DocumentMetadata {
                presentation_id: String::new(),
                source_name: None,
                file_hash: "abc".into(),
                extracted_at: chrono::Utc::now(),
                title: None,
                author: None,
                last_modified_by: None,
                created: None,
                modified: None,
                revision: None,
                language: None,
                company: None,
                custom_properties: Vec::new(),
                slide_size: SlideSize::default(),
                aspect_ratio: "16:9".into(),
            },
            themes: Vec::new(),
            masters: Vec::new(),
            layouts: Vec::new(),
            slides: vec![Slide {
                id: "256".into(),
                index: 1,
                part_name: "ppt/slides/slide1.xml".into(),
                layout_id: "slideLayouts/slideLayout1".into(),
                hidden: false,
                has_notes: false,
                transition: None,
                background: Background::None,
                role: SlideRole::TitleSlide,
                content_hash: String::new(),
                shapes: vec![title, picture],
                statistics: SlideStatistics::default(),
            }],
            statistics: DocumentStatistics::default(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn unknown_shape_is_rejected_at_record_time() {
        let doc = document();
        let mut builder = DiffBuilder::new(&doc);
        let err = builder
            .record_edit(ShapeKey::new("256", "99"), EditField::Text, EditValue::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, DeckError::UnknownShapeReference { .. }));
        let err = builder
            .record_edit(ShapeKey::new("999", "2"), EditField::Text, EditValue::Text("x".into()))
            .unwrap_err();
        assert!(matches!(err, DeckError::UnknownShapeReference { .. }));
    }

    #[test]
    fn mismatched_values_and_kinds_are_invalid() {
        let doc = document();
        let mut builder = DiffBuilder::new(&doc);
        let key = ShapeKey::new("256", "2");
        assert!(matches!(
            builder.record_edit(key.clone(), EditField::Bold { run: None }, EditValue::Number(1.0)),
            Err(DeckError::InvalidEdit { .. })
        ));
        assert!(matches!(
            builder.record_edit(
                ShapeKey::new("256", "3"),
                EditField::Text,
                EditValue::Text("x".into())
            ),
            Err(DeckError::InvalidEdit { .. })
        ));
        assert!(matches!(
            builder.record_edit(
                key.clone(),
                EditField::RunText { paragraph: 0, run: 5 },
                EditValue::Text("x".into())
            ),
            Err(DeckError::InvalidEdit { .. })
        ));
        assert!(matches!(
            builder.record_edit(
                key,
                EditField::RunText { paragraph: 0, run: 1 },
                EditValue::Text("x".into())
            ),
            Err(DeckError::InvalidEdit { .. })
        ));
        assert!(builder.finalize().is_empty());
    }

    #[test]
    fn later_edit_of_same_field_wins() {
        let doc = document();
        let mut builder = DiffBuilder::new(&doc);
        let key = ShapeKey::new("256", "2");
        builder
            .record_edit(key.clone(), EditField::Text, EditValue::Text("Q4".into()))
            .unwrap();
        builder
            .record_edit(key.clone(), EditField::Text, EditValue::Text("Q5".into()))
            .unwrap();
        builder
            .record_edit(
                ShapeKey::new("256", "3"),
                EditField::Bounds,
                EditValue::Bounds(Bounds {
                    x: 0.1,
                    y: 0.1,
                    width: 0.2,
                    height: 0.2,
                    ..Default::default()
                }),
            )
            .unwrap();

        let diff = builder.finalize();
        assert_eq!(diff.len(), 2);
        assert_eq!(diff.base_file_hash, "abc");
        assert_eq!(diff.edits_for(&key)[0].value, EditValue::Text("Q5".into()));
        assert_eq!(diff.slide_ids(), vec!["256"]);
        assert!(diff.validate(&doc).is_ok());
    }
}
