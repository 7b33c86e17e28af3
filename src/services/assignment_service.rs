//! Edits to individual roster seats.

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AssignmentSlot, SlotHistoryEntry, SlotUpdate};
use crate::domain::ports::{AssignmentSlotRepository, WorkerRoster};

/// Edits the roster seats of stored shift definitions.
///
/// Slots are never created or removed here; they follow their definition.
pub struct AssignmentService<L: AssignmentSlotRepository, W: WorkerRoster> {
    slots: Arc<L>,
    roster: Arc<W>,
}

impl<L: AssignmentSlotRepository, W: WorkerRoster> AssignmentService<L, W> {
    /// Create a service over the slot store and the worker roster.
    pub fn new(slots: Arc<L>, roster: Arc<W>) -> Self {
        Self { slots, roster }
    }

    /// Apply a partial update to a slot.
    ///
    /// Every worker the update references must be on the roster. Only the
    /// fields present in `update` are written.
    #[instrument(skip(self, update))]
    pub async fn update_slot(
        &self,
        slot_id: Uuid,
        update: SlotUpdate,
    ) -> DomainResult<AssignmentSlot> {
        update.validate()?;

        if self.slots.get(slot_id).await?.is_none() {
            return Err(DomainError::SlotNotFound(slot_id));
        }

        for worker_id in update.referenced_workers() {
            if self.roster.resolve(worker_id).await?.is_none() {
                return Err(DomainError::WorkerNotFound(worker_id));
            }
        }

        let slot = self.slots.update(slot_id, &update).await?;

        tracing::info!(
            %slot_id,
            assigned = ?slot.assigned_worker_id,
            open_for_replacement = slot.open_for_replacement,
            "slot updated"
        );
        Ok(slot)
    }

    /// Put `worker_id` in the slot, or empty it with `None`.
    pub async fn assign(
        &self,
        slot_id: Uuid,
        worker_id: Option<Uuid>,
    ) -> DomainResult<AssignmentSlot> {
        self.update_slot(slot_id, SlotUpdate::assign(worker_id)).await
    }

    pub async fn mark_open_for_replacement(
        &self,
        slot_id: Uuid,
        open: bool,
    ) -> DomainResult<AssignmentSlot> {
        let update = SlotUpdate {
            open_for_replacement: Some(open),
            ..Default::default()
        };
        self.update_slot(slot_id, update).await
    }

    /// Record who stands in for the assigned worker.
    pub async fn assign_replacement(
        &self,
        slot_id: Uuid,
        worker_id: Option<Uuid>,
    ) -> DomainResult<AssignmentSlot> {
        let update = SlotUpdate {
            replacement_worker_id: Some(worker_id),
            ..Default::default()
        };
        self.update_slot(slot_id, update).await
    }

    pub async fn set_attended(
        &self,
        slot_id: Uuid,
        attended: bool,
    ) -> DomainResult<AssignmentSlot> {
        let update = SlotUpdate {
            attended: Some(attended),
            ..Default::default()
        };
        self.update_slot(slot_id, update).await
    }

    /// Every recorded state of a slot, oldest first.
    pub async fn slot_history(&self, slot_id: Uuid) -> DomainResult<Vec<SlotHistoryEntry>> {
        let history = self.slots.history(slot_id).await?;
        if history.is_empty() {
            return Err(DomainError::SlotNotFound(slot_id));
        }
        Ok(history)
    }
}
