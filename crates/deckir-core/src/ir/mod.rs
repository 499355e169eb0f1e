//! The intermediate representation produced by extraction.

pub mod document;
pub mod shape;
pub mod slide;
pub mod stats;
pub mod text;

pub use document::{
    ColorMapEntry, CustomProperty, Document, DocumentMetadata, FontScheme, Layout, Master,
    ShapeExtractionWarning, Theme, ThemeColor,
};
pub use shape::{
    ChartShape, Fill, GeometrySource, GroupShape, ImageShape, Placeholder, PlaceholderKind,
    PreorderShapes, Shape, ShapeKey, ShapeKind, ShapeRole, Stroke, TableShape, TextShape,
};
pub use slide::{Background, Slide, SlideRole};
pub use stats::{ColorUsage, DocumentStatistics, ElementCounts, LayoutUsage, RoleCount, SlideStatistics};
pub use text::{
    Alignment, Bullet, FormattingRecord, Paragraph, Run, RunKind, RunProvenance, Spacing, TextFrame,
};
