use super::shape::{PreorderShapes, Shape};
use super::stats::SlideStatistics;
use crate::normalize::ColorValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SlideRole {
    TitleSlide,
    DataVisualization,
    TableContent,
    ImageGallery,
    #[default]
    Content,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Background {
    #[default]
    None,
    Solid { color: ColorValue },
    Gradient,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// `p:sldId/@id` of the presentation; stable across reordering.
    pub id: String,
    /// 1-based position in presentation order.
    pub index: usize,
    pub part_name: String,
    pub layout_id: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub has_notes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    #[serde(default)]
    pub background: Background,
    pub role: SlideRole,
    /// First 16 hex digits of the SHA-256 of the slide part.
    pub content_hash: String,
    pub shapes: Vec<Shape>,
    pub statistics: SlideStatistics,
}

impl Slide {
    /// All shapes, group children included, in extraction order.
    pub fn shapes_preorder(&self) -> PreorderShapes<'_> {
        PreorderShapes::new(&self.shapes)
    }

    pub fn find_shape(&self, shape_id: &str) -> Option<&Shape> {
        self.shapes_preorder().find(|s| s.id == shape_id)
    }
}
