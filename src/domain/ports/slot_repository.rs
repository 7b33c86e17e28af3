//! Repository port for assignment slot persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AssignmentSlot, SlotHistoryEntry, SlotUpdate};

/// Slots are created alongside their definition (see
/// `ShiftDefinitionRepository::create_with_slots`) and removed with it, so
/// this port only reads and updates them.
#[async_trait]
pub trait AssignmentSlotRepository: Send + Sync {
    /// Get a slot by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<AssignmentSlot>>;

    /// All slots of a definition, ordered by seat position.
    async fn list_for_shift(&self, shift_definition_id: Uuid) -> DomainResult<Vec<AssignmentSlot>>;

    /// Write the fields present in `update` and return the stored slot.
    ///
    /// Fields absent from the update keep their stored value, so edits to
    /// different fields never overwrite each other. Edits to the same field
    /// are last-write-wins. A history snapshot is appended in the same
    /// transaction.
    async fn update(&self, slot_id: Uuid, update: &SlotUpdate) -> DomainResult<AssignmentSlot>;

    /// Snapshots of a slot, oldest first. Survives deletion of the slot.
    async fn history(&self, slot_id: Uuid) -> DomainResult<Vec<SlotHistoryEntry>>;
}
