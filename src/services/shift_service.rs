//! Service for managing shift definitions and their rosters.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AssignmentSlot, ShiftDefinition, ShiftHistoryEntry, ShiftUpdate};
use crate::domain::ports::{AssignmentSlotRepository, ShiftDefinitionRepository};

/// Creates, edits and removes shift definitions together with their rosters.
pub struct ShiftService<S: ShiftDefinitionRepository, L: AssignmentSlotRepository> {
    shifts: Arc<S>,
    slots: Arc<L>,
}

impl<S: ShiftDefinitionRepository, L: AssignmentSlotRepository> ShiftService<S, L> {
    /// Create a service over the definition and slot stores.
    pub fn new(shifts: Arc<S>, slots: Arc<L>) -> Self {
        Self { shifts, slots }
    }

    /// Validate and persist a definition with one empty slot per required worker.
    #[instrument(skip(self, shift), fields(title = %shift.title, kind = shift.kind.as_str()))]
    pub async fn create_shift(
        &self,
        mut shift: ShiftDefinition,
    ) -> DomainResult<(ShiftDefinition, Vec<AssignmentSlot>)> {
        shift.normalize();
        shift.validate()?;

        let slots = AssignmentSlot::roster_for(&shift);
        self.shifts.create_with_slots(&shift, &slots).await?;

        tracing::info!(shift_id = %shift.id, slots = slots.len(), "shift created");
        Ok((shift, slots))
    }

    /// A definition together with its roster, ordered by position.
    pub async fn get_shift(
        &self,
        id: Uuid,
    ) -> DomainResult<(ShiftDefinition, Vec<AssignmentSlot>)> {
        let shift = self
            .shifts
            .get(id)
            .await?
            .ok_or(DomainError::ShiftNotFound(id))?;
        let slots = self.slots.list_for_shift(id).await?;
        Ok((shift, slots))
    }

    /// Apply a partial update. The roster size never changes.
    #[instrument(skip(self, update))]
    pub async fn update_shift(
        &self,
        id: Uuid,
        update: ShiftUpdate,
    ) -> DomainResult<ShiftDefinition> {
        if update.is_empty() {
            return Err(DomainError::ValidationFailed("no fields to update".to_string()));
        }

        let mut shift = self
            .shifts
            .get(id)
            .await?
            .ok_or(DomainError::ShiftNotFound(id))?;

        update.apply_to(&mut shift);
        shift.normalize();
        shift.validate()?;
        shift.updated_at = Utc::now();

        self.shifts.update(&shift).await?;
        tracing::info!(shift_id = %id, "shift updated");
        Ok(shift)
    }

    /// Delete a definition; its slots go with it.
    #[instrument(skip(self))]
    pub async fn delete_shift(&self, id: Uuid) -> DomainResult<()> {
        self.shifts.delete(id).await?;
        tracing::info!(shift_id = %id, "shift deleted");
        Ok(())
    }

    /// Every recorded state of a definition, oldest first. Available after
    /// deletion too.
    pub async fn shift_history(&self, id: Uuid) -> DomainResult<Vec<ShiftHistoryEntry>> {
        let history = self.shifts.history(id).await?;
        if history.is_empty() {
            return Err(DomainError::ShiftNotFound(id));
        }
        Ok(history)
    }
}
