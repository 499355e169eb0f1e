//! Package → [`Document`](crate::ir::Document) extraction.

mod extractor;
pub mod metadata;
mod shapes;
mod slide;
pub mod stats;

pub use extractor::Extractor;
pub use metadata::{presentation_id, read_metadata};
pub use stats::{document_statistics, slide_statistics};
