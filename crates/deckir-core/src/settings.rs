use crate::error::{DeckError, Result};
use crate::style::CascadePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionSettings {
    pub cascade_policy: CascadePolicy,
    /// Extract slides on the rayon pool.
    pub parallel_slides: bool,
    /// Minimum slide count before slides are extracted in parallel.
    pub parallel_threshold: usize,
    /// Colors closer than this CIE76 distance count as one in slide statistics.
    pub color_merge_delta_e: f64,
    pub include_table_cells: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            cascade_policy: CascadePolicy::default(),
            parallel_slides: true,
            parallel_threshold: 8,
            color_merge_delta_e: 10.0,
            include_table_cells: true,
        }
    }
}

impl ExtractionSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.color_merge_delta_e.is_finite() || self.color_merge_delta_e < 0.0 {
            return Err(DeckError::InvalidSettings(format!(
                "colorMergeDeltaE must be a non-negative number, got {}",
                self.color_merge_delta_e
            )));
        }
        if self.parallel_threshold == 0 {
            return Err(DeckError::InvalidSettings(
                "parallelThreshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a document with `slide_count` slides is extracted in parallel.
    pub fn use_parallel(&self, slide_count: usize) -> bool {
        self.parallel_slides && slide_count >= self.parallel_threshold
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegenerationSettings {
    /// Log a warning when the source file no longer matches the document's hash.
    pub verify_source_hash: bool,
    /// Treat a missing slide or shape as a fatal error instead of a skip.
    pub strict: bool,
}

impl Default for RegenerationSettings {
    fn default() -> Self {
        Self {
            verify_source_hash: true,
            strict: false,
        }
    }
}

impl RegenerationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }
}
