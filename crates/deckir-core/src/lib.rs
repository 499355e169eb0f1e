pub mod diff;
pub mod error;
pub mod extract;
pub mod hash;
pub mod ir;
pub mod normalize;
pub mod package;
pub mod regen;
pub mod settings;
pub mod shape_tree;
pub mod style;
pub mod xml;

pub use error::{DeckError, Result};

pub use diff::{derive_diff, Diff, DiffBuilder, Edit, EditField, EditValue, RunIndex};
pub use extract::Extractor;
pub use ir::{Document, Shape, ShapeKey, Slide};
pub use normalize::{Bounds, ColorValue};
pub use regen::{RegenerationOutcome, RegenerationReport, Regenerator};
pub use settings::{ExtractionSettings, RegenerationSettings};
pub use style::{CascadeLevel, CascadePolicy};
