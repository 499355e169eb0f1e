//! SHA-256 fingerprints for containers and parts.

pub mod sha256;

pub use sha256::{content_hash, file_hash};
