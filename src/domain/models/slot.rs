//! Assignment slot domain model.
//!
//! Slots are the standing roster seats of a shift definition. The same slot,
//! and the worker sitting in it, appears on every occurrence of its definition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shift::{ShiftDefinition, MAX_NOTES_LEN};
use crate::domain::errors::{DomainError, DomainResult};

/// A persistent seat in a shift definition's roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentSlot {
    pub id: Uuid,
    /// Owning definition; slots are deleted with it.
    pub shift_definition_id: Uuid,
    /// Seat index within the roster, starting at 0.
    pub position: u16,
    pub assigned_worker_id: Option<Uuid>,
    pub attended: bool,
    /// Worker proposed to take over this seat.
    pub replacement_worker_id: Option<Uuid>,
    /// Whether the assigned worker is looking for someone to take the seat.
    pub open_for_replacement: bool,
    pub notes: String,
    pub updated_at: DateTime<Utc>,
}

impl AssignmentSlot {
    /// Create an empty seat for `shift_definition_id`.
    pub fn empty(shift_definition_id: Uuid, position: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            shift_definition_id,
            position,
            assigned_worker_id: None,
            attended: false,
            replacement_worker_id: None,
            open_for_replacement: false,
            notes: String::new(),
            updated_at: Utc::now(),
        }
    }

    /// Build the full roster of a new definition: exactly
    /// `required_worker_count` empty seats.
    pub fn roster_for(shift: &ShiftDefinition) -> Vec<Self> {
        (0..shift.required_worker_count)
            .map(|position| Self::empty(shift.id, position))
            .collect()
    }

    pub fn is_filled(&self) -> bool {
        self.assigned_worker_id.is_some()
    }
}

/// Partial update of an assignment slot.
///
/// `Some(None)` on a worker field clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotUpdate {
    pub assigned_worker_id: Option<Option<Uuid>>,
    pub open_for_replacement: Option<bool>,
    pub replacement_worker_id: Option<Option<Uuid>>,
    pub attended: Option<bool>,
    pub notes: Option<String>,
}

impl SlotUpdate {
    pub fn assign(worker_id: Option<Uuid>) -> Self {
        Self {
            assigned_worker_id: Some(worker_id),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assigned_worker_id.is_none()
            && self.open_for_replacement.is_none()
            && self.replacement_worker_id.is_none()
            && self.attended.is_none()
            && self.notes.is_none()
    }

    /// Worker ids this update would store, which must all exist.
    pub fn referenced_workers(&self) -> Vec<Uuid> {
        [self.assigned_worker_id, self.replacement_worker_id]
            .into_iter()
            .flatten()
            .flatten()
            .collect()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(ref notes) = self.notes {
            if notes.chars().count() > MAX_NOTES_LEN {
                return Err(DomainError::ValidationFailed(format!(
                    "notes must be at most {} characters",
                    MAX_NOTES_LEN
                )));
            }
        }
        Ok(())
    }
}
