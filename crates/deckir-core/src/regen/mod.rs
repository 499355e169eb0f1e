//! Diff application onto the original package.
//!
//! The source is reopened for every run. Only slide parts that receive at
//! least one edit are reserialized; every other entry is written back with
//! its original bytes.

mod apply;
mod regenerator;
mod report;

pub use regenerator::Regenerator;
pub use report::{AppliedEdit, RegenerationOutcome, RegenerationReport, SkippedEdit};
