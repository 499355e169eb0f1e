//! Formatting inheritance: immutable snapshots of every style-bearing part
//! and a per-property cascade over them.

pub mod cascade;
pub mod props;
pub mod resolver;
pub mod snapshot;

pub use cascade::{CascadeLevel, CascadePolicy};
pub use props::{LevelStyle, ListStyle, ParaProps, RunProps};
pub use resolver::{ResolvedParagraph, ShapeStyle, SlideStyle};
pub use snapshot::{
    match_placeholder, part_id, ColorMap, LayoutSnapshot, MasterSnapshot, PlaceholderSnapshot,
    StyleSnapshots, ThemeSnapshot,
};
