//! Per-item outcomes of a batch upload.
//!
//! A batch never hides a failed item: every intent and slot ends up in the
//! report as either created/updated (with its id) or failed (with the error).

use serde::{Deserialize, Serialize};

use crate::error::ResourceKind;

/// Whether an upsert created a new resource or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

/// Outcome of one item of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ItemOutcome {
    Succeeded { id: String, action: UpsertAction },
    Failed { error: String },
    /// Not attempted because its parent failed.
    Skipped { reason: String },
}

/// One line of an upload report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReport {
    pub kind: String,
    pub name: String,
    /// Name of the owning intent, for slots.
    pub parent: Option<String>,
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Aggregate report of an intent upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadReport {
    pub items: Vec<ItemReport>,
}

impl UploadReport {
    pub fn record(
        &mut self,
        kind: ResourceKind,
        name: impl Into<String>,
        parent: Option<&str>,
        outcome: ItemOutcome,
    ) {
        self.items.push(ItemReport {
            kind: kind.to_string(),
            name: name.into(),
            parent: parent.map(str::to_string),
            outcome,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items
            .iter()
            .filter(|item| !matches!(item.outcome, ItemOutcome::Succeeded { .. }))
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, ItemOutcome::Succeeded { .. }))
            .count()
    }
}
