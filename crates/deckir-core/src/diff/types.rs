//! Field-level edits and the validated [`Diff`] that carries them.

use crate::error::Result;
use crate::ir::ShapeKey;
use crate::normalize::{Bounds, ColorValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Addresses one run inside a text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunIndex {
    pub paragraph: usize,
    pub run: usize,
}

impl RunIndex {
    pub fn new(paragraph: usize, run: usize) -> Self {
        Self { paragraph, run }
    }
}

/// The property an edit changes. Formatting fields target every run of the
/// shape when `run` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum EditField {
    /// Whole-shape text; `\n` separates paragraphs.
    Text,
    RunText { paragraph: usize, run: usize },
    FontFamily {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run: Option<RunIndex>,
    },
    FontSize {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run: Option<RunIndex>,
    },
    Bold {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run: Option<RunIndex>,
    },
    Italic {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run: Option<RunIndex>,
    },
    Underline {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run: Option<RunIndex>,
    },
    FontColor {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        run: Option<RunIndex>,
    },
    FillColor,
    AltText,
    Bounds,
}

impl EditField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::RunText { .. } => "runText",
            Self::FontFamily { .. } => "fontFamily",
            Self::FontSize { .. } => "fontSize",
            Self::Bold { .. } => "bold",
            Self::Italic { .. } => "italic",
            Self::Underline { .. } => "underline",
            Self::FontColor { .. } => "fontColor",
            Self::FillColor => "fillColor",
            Self::AltText => "altText",
            Self::Bounds => "bounds",
        }
    }

    /// The run a field addresses, if it addresses a single one.
    pub fn run_index(&self) -> Option<RunIndex> {
        match *self {
            Self::RunText { paragraph, run } => Some(RunIndex { paragraph, run }),
            Self::FontFamily { run }
            | Self::FontSize { run }
            | Self::Bold { run }
            | Self::Italic { run }
            | Self::Underline { run }
            | Self::FontColor { run } => run,
            _ => None,
        }
    }

    /// Fields that change run properties (`a:rPr`).
    pub fn is_run_formatting(&self) -> bool {
        matches!(
            self,
            Self::FontFamily { .. }
                | Self::FontSize { .. }
                | Self::Bold { .. }
                | Self::Italic { .. }
                | Self::Underline { .. }
                | Self::FontColor { .. }
        )
    }

    pub(crate) fn expected_value(&self) -> &'static str {
        match self {
            Self::Text | Self::RunText { .. } | Self::FontFamily { .. } | Self::AltText => "text",
            Self::FontSize { .. } => "number",
            Self::Bold { .. } | Self::Italic { .. } | Self::Underline { .. } => "flag",
            Self::FontColor { .. } | Self::FillColor => "color",
            Self::Bounds => "bounds",
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.run_index() {
            Some(idx) => write!(f, "{}[{}:{}]", self.name(), idx.paragraph, idx.run),
            None => f.write_str(self.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum EditValue {
    Text(String),
    /// Font size in points.
    Number(f64),
    Flag(bool),
    Color(ColorValue),
    Bounds(Bounds),
}

impl EditValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Flag(_) => "flag",
            Self::Color(_) => "color",
            Self::Bounds(_) => "bounds",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    #[serde(flatten)]
    pub field: EditField,
    pub value: EditValue,
}

/// Edits of one shape, in recording order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeEdits {
    #[serde(flatten)]
    pub key: ShapeKey,
    pub edits: Vec<Edit>,
}

/// A sparse set of field-level edits keyed by shape.
///
/// Only [`DiffBuilder`](super::DiffBuilder) creates a `Diff`, so every key
/// exists in the document it was built against. A deserialized `Diff` is
/// revalidated by [`Diff::validate`] before it is applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diff {
    /// `fileHash` of the document the diff was built against.
    pub base_file_hash: String,
    pub(crate) shapes: Vec<ShapeEdits>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.shapes.iter().all(|s| s.edits.is_empty())
    }

    /// Total number of edits.
    pub fn len(&self) -> usize {
        self.shapes.iter().map(|s| s.edits.len()).sum()
    }

    pub fn shapes(&self) -> &[ShapeEdits] {
        &self.shapes
    }

    pub fn edits_for(&self, key: &ShapeKey) -> &[Edit] {
        self.shapes
            .iter()
            .find(|s| &s.key == key)
            .map(|s| s.edits.as_slice())
            .unwrap_or(&[])
    }

    /// Slide ids with at least one edit, in first-edit order.
    pub fn slide_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for shape in &self.shapes {
            if !ids.contains(&shape.key.slide_id.as_str()) {
                ids.push(&shape.key.slide_id);
            }
        }
        ids
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a diff. The result is unchecked until [`Diff::validate`] runs.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_display_includes_run() {
        assert_eq!(EditField::Text.to_string(), "text");
        assert_eq!(
            EditField::Bold {
                run: Some(RunIndex::new(1, 2))
            }
            .to_string(),
            "bold[1:2]"
        );
    }

    #[test]
    fn edit_json_shape() {
        let edit = Edit {
            field: EditField::FontSize { run: None },
            value: EditValue::Number(24.0),
        };
        let json = serde_json::to_value(&edit).unwrap();
        assert_eq!(json["field"], "fontSize");
        assert_eq!(json["value"]["type"], "number");
        let back: Edit = serde_json::from_value(json).unwrap();
        assert_eq!(back, edit);
    }
}
