use super::text::TextFrame;
use crate::normalize::{Bounds, ColorValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Addresses one shape: the slide's stable id plus the shape's native id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeKey {
    pub slide_id: String,
    pub shape_id: String,
}

impl ShapeKey {
    pub fn new(slide_id: impl Into<String>, shape_id: impl Into<String>) -> Self {
        Self {
            slide_id: slide_id.into(),
            shape_id: shape_id.into(),
        }
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.slide_id, self.shape_id)
    }
}

/// Placeholder types of `p:ph/@type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlaceholderKind {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "ctrTitle")]
    CenteredTitle,
    #[serde(rename = "subTitle")]
    Subtitle,
    #[serde(rename = "body")]
    Body,
    #[default]
    #[serde(rename = "obj")]
    Object,
    #[serde(rename = "chart")]
    Chart,
    #[serde(rename = "tbl")]
    Table,
    #[serde(rename = "clipArt")]
    ClipArt,
    #[serde(rename = "dgm")]
    Diagram,
    #[serde(rename = "media")]
    Media,
    #[serde(rename = "sldImg")]
    SlideImage,
    #[serde(rename = "pic")]
    Picture,
    #[serde(rename = "dt")]
    Date,
    #[serde(rename = "ftr")]
    Footer,
    #[serde(rename = "sldNum")]
    SlideNumber,
    #[serde(rename = "hdr")]
    Header,
}

impl PlaceholderKind {
    /// Parses `p:ph/@type`; an absent type means `obj`.
    pub fn from_xml(value: Option<&str>) -> Self {
        match value.unwrap_or("obj") {
            "title" => Self::Title,
            "ctrTitle" => Self::CenteredTitle,
            "subTitle" => Self::Subtitle,
            "body" => Self::Body,
            "chart" => Self::Chart,
            "tbl" => Self::Table,
            "clipArt" => Self::ClipArt,
            "dgm" => Self::Diagram,
            "media" => Self::Media,
            "sldImg" => Self::SlideImage,
            "pic" => Self::Picture,
            "dt" => Self::Date,
            "ftr" => Self::Footer,
            "sldNum" => Self::SlideNumber,
            "hdr" => Self::Header,
            _ => Self::Object,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenteredTitle)
    }

    /// Kind used for inheritance matching: `ctrTitle` behaves as `title`,
    /// `subTitle` and `obj` as `body`.
    pub fn inheritance_kind(&self) -> Self {
        match self {
            Self::CenteredTitle => Self::Title,
            Self::Subtitle | Self::Object => Self::Body,
            other => *other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub shape_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

/// Where a shape's bounds came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GeometrySource {
    #[default]
    Own,
    LayoutPlaceholder,
    MasterPlaceholder,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ShapeRole {
    Title,
    Body,
    DataVisualization,
    #[default]
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Fill {
    None,
    Solid { color: ColorValue },
    Gradient { stops: Vec<ColorValue> },
    Pattern,
    Image,
    /// No fill of its own; follows the shape style or placeholder.
    #[default]
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShape {
    /// `None` for shapes without a text body, such as connectors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_frame: Option<TextFrame>,
    pub fill: Fill,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(default)]
    pub connector: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ImageShape {
    #[serde(rename_all = "camelCase")]
    Picture {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media_part: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
    },
    /// A graphic frame whose payload is not interpreted (SmartArt, OLE, media).
    #[serde(rename_all = "camelCase")]
    Graphic { uri: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChartShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_part: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub series_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableShape {
    pub rows: usize,
    pub columns: usize,
    /// Cell texts by row; empty unless table-cell extraction is enabled.
    #[serde(default)]
    pub cells: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupShape {
    pub children: Vec<Shape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShapeKind {
    Text(TextShape),
    Image(ImageShape),
    Chart(ChartShape),
    Table(TableShape),
    Group(GroupShape),
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Chart(_) => "chart",
            Self::Table(_) => "table",
            Self::Group(_) => "group",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// Native `p:cNvPr/@id`, unique within the slide.
    pub id: String,
    pub name: String,
    /// Slide-relative box with the shape's own rotation and flips. Group
    /// offsets and scaling are composed in; a group's rotation and flips are
    /// not, so children of a rotated group keep their unrotated boxes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    pub geometry_source: GeometrySource,
    pub role: ShapeRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Placeholder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    /// Position in the slide's pre-order shape traversal.
    pub z_order: usize,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    pub fn text_frame(&self) -> Option<&super::text::TextFrame> {
        match &self.kind {
            ShapeKind::Text(t) => t.text_frame.as_ref(),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Shape] {
        match &self.kind {
            ShapeKind::Group(g) => &g.children,
            _ => &[],
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ShapeKind::Group(_))
    }
}

/// Pre-order iterator over a shape forest, driven by an explicit stack.
pub struct PreorderShapes<'a> {
    stack: Vec<&'a Shape>,
}

impl<'a> PreorderShapes<'a> {
    pub fn new(roots: &'a [Shape]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PreorderShapes<'a> {
    type Item = &'a Shape;

    fn next(&mut self) -> Option<Self::Item> {
        let shape = self.stack.pop()?;
        self.stack.extend(shape.children().iter().rev());
        Some(shape)
    }
}
