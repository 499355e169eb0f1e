use crate::diff::EditField;
use crate::ir::ShapeKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RegenerationOutcome {
    Success,
    /// At least one edit was skipped; the rest were applied.
    PartialSuccess,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedEdit {
    #[serde(flatten)]
    pub key: ShapeKey,
    pub field: EditField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEdit {
    #[serde(flatten)]
    pub key: ShapeKey,
    /// `None` when every edit of the shape was skipped at once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<EditField>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerationReport {
    pub applied: Vec<AppliedEdit>,
    pub skipped: Vec<SkippedEdit>,
    pub rewritten_parts: Vec<String>,
    pub source_hash_matched: bool,
}

impl RegenerationReport {
    pub fn outcome(&self) -> RegenerationOutcome {
        if self.skipped.is_empty() {
            RegenerationOutcome::Success
        } else {
            RegenerationOutcome::PartialSuccess
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub(crate) fn skip(&mut self, key: &ShapeKey, field: Option<EditField>, reason: impl Into<String>) {
        let reason = reason.into();
        match field {
            Some(field) => log::warn!("skipped {} on {}: {}", field, key, reason),
            None => log::warn!("skipped edits on {}: {}", key, reason),
        }
        self.skipped.push(SkippedEdit {
            key: key.clone(),
            field,
            reason,
        });
    }
}
