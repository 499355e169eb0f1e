use super::shape::{Placeholder, Shape, ShapeKey};
use super::slide::Slide;
use super::stats::DocumentStatistics;
use crate::error::Result;
use crate::normalize::ColorValue;
use crate::package::SlideSize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// UUID v5 derived from `file_hash`.
    pub presentation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    /// SHA-256 (hex) of the container bytes.
    pub file_hash: String,
    pub extracted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub custom_properties: Vec<CustomProperty>,
    pub slide_size: SlideSize,
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColor {
    pub slot: String,
    pub color: ColorValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FontScheme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub part_name: String,
    pub name: String,
    /// dk1, lt1, dk2, lt2, accent1..accent6, hlink, folHlink in scheme order.
    pub color_scheme: Vec<ThemeColor>,
    pub fonts: FontScheme,
    pub effect_style_count: usize,
}

impl Theme {
    pub fn color(&self, slot: &str) -> Option<&ColorValue> {
        self.color_scheme
            .iter()
            .find(|c| c.slot == slot)
            .map(|c| &c.color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorMapEntry {
    pub name: String,
    pub slot: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Master {
    pub id: String,
    pub part_name: String,
    pub theme_id: String,
    pub placeholders: Vec<Placeholder>,
    pub layout_ids: Vec<String>,
    /// `p:clrMap`: logical name (tx1, bg1, ...) to scheme slot.
    pub color_map: Vec<ColorMapEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub id: String,
    pub part_name: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_type: Option<String>,
    pub master_id: String,
    pub placeholders: Vec<Placeholder>,
}

/// A shape skipped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeExtractionWarning {
    pub slide_id: String,
    pub part_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_id: Option<String>,
    pub reason: String,
}

/// The extracted presentation. Built once; edits are expressed as a `Diff`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub metadata: DocumentMetadata,
    pub themes: Vec<Theme>,
    pub masters: Vec<Master>,
    pub layouts: Vec<Layout>,
    pub slides: Vec<Slide>,
    pub statistics: DocumentStatistics,
    #[serde(default)]
    pub warnings: Vec<ShapeExtractionWarning>,
}

impl Document {
    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, slide_id: &str) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == slide_id)
    }

    pub fn shape(&self, key: &ShapeKey) -> Option<&Shape> {
        self.slide(&key.slide_id)?.find_shape(&key.shape_id)
    }

    pub fn theme(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn master(&self, id: &str) -> Option<&Master> {
        self.masters.iter().find(|m| m.id == id)
    }

    pub fn layout(&self, id: &str) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.id == id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
