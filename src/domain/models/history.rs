//! Audit trail of definition and roster edits.
//!
//! Every write to a shift definition or an assignment slot appends a full
//! snapshot of the row as it stood afterwards (or, for deletions, just
//! before). History rows outlive the records they describe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shift::ShiftDefinition;
use super::slot::AssignmentSlot;

/// What kind of write produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryChange {
    Created,
    Updated,
    Deleted,
}

impl HistoryChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// Snapshot of a shift definition after one write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftHistoryEntry {
    /// Monotonic sequence number; orders entries of the same record.
    pub history_id: i64,
    pub change: HistoryChange,
    pub recorded_at: DateTime<Utc>,
    pub shift: ShiftDefinition,
}

/// Snapshot of an assignment slot after one write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotHistoryEntry {
    pub history_id: i64,
    pub change: HistoryChange,
    pub recorded_at: DateTime<Utc>,
    pub slot: AssignmentSlot,
}
