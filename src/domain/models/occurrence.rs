//! Computed shift occurrences.
//!
//! Occurrences are never persisted. They are rebuilt on every list query
//! from the stored definitions and the current state of their slots.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use super::shift::{RotationWeek, ShiftDefinition, ShiftKind, ShiftWeekday};
use super::slot::AssignmentSlot;

/// Snapshot of a roster seat as it appears on an occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSnapshot {
    pub slot_id: Uuid,
    pub assigned_worker_id: Option<Uuid>,
    pub assigned_worker_name: Option<String>,
    pub attended: bool,
    pub replacement_worker_id: Option<Uuid>,
    pub open_for_replacement: bool,
}

impl SlotSnapshot {
    pub fn new(slot: &AssignmentSlot, assigned_worker_name: Option<String>) -> Self {
        Self {
            slot_id: slot.id,
            assigned_worker_id: slot.assigned_worker_id,
            assigned_worker_name,
            attended: slot.attended,
            replacement_worker_id: slot.replacement_worker_id,
            open_for_replacement: slot.open_for_replacement,
        }
    }
}

/// A concrete calendar-date instance of a shift definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub definition_id: Uuid,
    pub title: String,
    pub date: NaiveDate,
    pub kind: ShiftKind,
    pub rotation_week: Option<RotationWeek>,
    pub weekday: Option<ShiftWeekday>,
    pub starting_time: Option<NaiveTime>,
    pub ending_time: Option<NaiveTime>,
    pub required_worker_count: u16,
    pub notes: Option<String>,
    pub slots: Vec<SlotSnapshot>,
}

impl Occurrence {
    pub fn new(shift: &ShiftDefinition, date: NaiveDate, slots: Vec<SlotSnapshot>) -> Self {
        Self {
            definition_id: shift.id,
            title: shift.title.clone(),
            date,
            kind: shift.kind,
            rotation_week: shift.rotation_week,
            weekday: shift.weekday,
            starting_time: shift.starting_time,
            ending_time: shift.ending_time,
            required_worker_count: shift.required_worker_count,
            notes: shift.notes.clone(),
            slots,
        }
    }

    /// Number of seats with a worker assigned.
    pub fn filled_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.assigned_worker_id.is_some())
            .count()
    }
}
