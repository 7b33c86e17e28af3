//! Repository port for shift definition persistence.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AssignmentSlot, RotationWeek, ShiftDefinition, ShiftHistoryEntry, ShiftKind, ShiftWeekday,
};

/// Criteria for selecting shift definitions. Present fields are AND-combined;
/// absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftCriteria {
    pub kind: Option<ShiftKind>,
    /// Case-insensitive substring of the title.
    pub title_contains: Option<String>,
    pub rotation_week: Option<RotationWeek>,
    pub weekday: Option<ShiftWeekday>,
    pub starting_time: Option<NaiveTime>,
    pub ending_time: Option<NaiveTime>,
    pub required_worker_count: Option<u16>,
    pub notes: Option<String>,
    /// `starting_date >= value`
    pub starting_on_or_after: Option<NaiveDate>,
    /// `starting_date <= value`
    pub starting_on_or_before: Option<NaiveDate>,
    /// `starting_date < value`
    pub starting_before: Option<NaiveDate>,
}

impl ShiftCriteria {
    /// Same non-date criteria with the date bounds cleared.
    pub fn without_dates(&self) -> Self {
        Self {
            starting_on_or_after: None,
            starting_on_or_before: None,
            starting_before: None,
            ..self.clone()
        }
    }
}

#[async_trait]
pub trait ShiftDefinitionRepository: Send + Sync {
    /// Persist a definition together with its roster in one transaction.
    /// Either everything is stored or nothing is. History snapshots of the
    /// definition and each slot are written in the same transaction.
    async fn create_with_slots(
        &self,
        shift: &ShiftDefinition,
        slots: &[AssignmentSlot],
    ) -> DomainResult<()>;

    /// Get a shift definition by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<ShiftDefinition>>;

    /// Update an existing shift definition and record a history snapshot.
    async fn update(&self, shift: &ShiftDefinition) -> DomainResult<()>;

    /// Delete a shift definition and, by cascade, its slots. The final state
    /// of both is kept in history.
    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// List definitions matching `criteria`, ordered by starting date then id.
    async fn list(&self, criteria: &ShiftCriteria) -> DomainResult<Vec<ShiftDefinition>>;

    /// Snapshots of a definition, oldest first.
    async fn history(&self, id: Uuid) -> DomainResult<Vec<ShiftHistoryEntry>>;
}
