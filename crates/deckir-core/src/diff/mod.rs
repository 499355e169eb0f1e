//! Validated field-level edits against an extracted document.

mod builder;
mod derive;
mod types;

pub use builder::DiffBuilder;
pub use derive::derive_diff;
pub use types::{Diff, Edit, EditField, EditValue, RunIndex, ShapeEdits};
