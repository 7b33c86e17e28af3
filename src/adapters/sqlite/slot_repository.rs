//! SQLite adapter for AssignmentSlotRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::history::{parse_change, record_slot};
use crate::adapters::sqlite::{parse_datetime, parse_optional_uuid, parse_uuid, Bind};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AssignmentSlot, HistoryChange, SlotHistoryEntry, SlotUpdate};
use crate::domain::ports::AssignmentSlotRepository;

#[derive(Clone)]
pub struct SqliteAssignmentSlotRepository {
    pool: SqlitePool,
}

impl SqliteAssignmentSlotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AssignmentSlotRow {
    id: String,
    shift_definition_id: String,
    position: i64,
    assigned_worker_id: Option<String>,
    attended: bool,
    replacement_worker_id: Option<String>,
    open_for_replacement: bool,
    notes: String,
    updated_at: String,
}

impl TryFrom<AssignmentSlotRow> for AssignmentSlot {
    type Error = DomainError;

    fn try_from(row: AssignmentSlotRow) -> Result<Self, Self::Error> {
        let position = u16::try_from(row.position).map_err(|_| {
            DomainError::SerializationError(format!("Invalid slot position: {}", row.position))
        })?;

        Ok(AssignmentSlot {
            id: parse_uuid(&row.id)?,
            shift_definition_id: parse_uuid(&row.shift_definition_id)?,
            position,
            assigned_worker_id: parse_optional_uuid(row.assigned_worker_id)?,
            attended: row.attended,
            replacement_worker_id: parse_optional_uuid(row.replacement_worker_id)?,
            open_for_replacement: row.open_for_replacement,
            notes: row.notes,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SlotHistoryRow {
    history_id: i64,
    id: String,
    shift_definition_id: String,
    position: i64,
    assigned_worker_id: Option<String>,
    attended: bool,
    replacement_worker_id: Option<String>,
    open_for_replacement: bool,
    notes: String,
    updated_at: String,
    change_type: String,
    recorded_at: String,
}

impl TryFrom<SlotHistoryRow> for SlotHistoryEntry {
    type Error = DomainError;

    fn try_from(row: SlotHistoryRow) -> Result<Self, Self::Error> {
        let slot = AssignmentSlot::try_from(AssignmentSlotRow {
            id: row.id,
            shift_definition_id: row.shift_definition_id,
            position: row.position,
            assigned_worker_id: row.assigned_worker_id,
            attended: row.attended,
            replacement_worker_id: row.replacement_worker_id,
            open_for_replacement: row.open_for_replacement,
            notes: row.notes,
            updated_at: row.updated_at,
        })?;

        Ok(SlotHistoryEntry {
            history_id: row.history_id,
            change: parse_change(&row.change_type)?,
            recorded_at: parse_datetime(&row.recorded_at)?,
            slot,
        })
    }
}

/// Build an UPDATE that sets only the columns present in `update`.
fn build_update_query(update: &SlotUpdate, updated_at: DateTime<Utc>) -> (String, Vec<Bind>) {
    let mut columns = vec!["updated_at = ?"];
    let mut bindings = vec![Bind::Text(updated_at.to_rfc3339())];

    if let Some(worker) = update.assigned_worker_id {
        columns.push("assigned_worker_id = ?");
        bindings.push(Bind::OptionalText(worker.map(|id| id.to_string())));
    }
    if let Some(attended) = update.attended {
        columns.push("attended = ?");
        bindings.push(Bind::Bool(attended));
    }
    if let Some(worker) = update.replacement_worker_id {
        columns.push("replacement_worker_id = ?");
        bindings.push(Bind::OptionalText(worker.map(|id| id.to_string())));
    }
    if let Some(open) = update.open_for_replacement {
        columns.push("open_for_replacement = ?");
        bindings.push(Bind::Bool(open));
    }
    if let Some(ref notes) = update.notes {
        columns.push("notes = ?");
        bindings.push(Bind::Text(notes.clone()));
    }

    let query = format!("UPDATE assignment_slots SET {} WHERE id = ?", columns.join(", "));
    (query, bindings)
}

#[async_trait]
impl AssignmentSlotRepository for SqliteAssignmentSlotRepository {
    async fn get(&self, id: Uuid) -> DomainResult<Option<AssignmentSlot>> {
        let row: Option<AssignmentSlotRow> =
            sqlx::query_as("SELECT * FROM assignment_slots WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(AssignmentSlot::try_from).transpose()
    }

    async fn list_for_shift(&self, shift_definition_id: Uuid) -> DomainResult<Vec<AssignmentSlot>> {
        let rows: Vec<AssignmentSlotRow> = sqlx::query_as(
            "SELECT * FROM assignment_slots WHERE shift_definition_id = ? ORDER BY position ASC",
        )
        .bind(shift_definition_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AssignmentSlot::try_from).collect()
    }

    async fn update(&self, slot_id: Uuid, update: &SlotUpdate) -> DomainResult<AssignmentSlot> {
        let (query, bindings) = build_update_query(update, Utc::now());
        let mut tx = self.pool.begin().await?;

        let mut q = sqlx::query(&query);
        for binding in bindings {
            q = match binding {
                Bind::Text(value) => q.bind(value),
                Bind::OptionalText(value) => q.bind(value),
                Bind::Int(value) => q.bind(value),
                Bind::Bool(value) => q.bind(value),
            };
        }
        let result = q.bind(slot_id.to_string()).execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SlotNotFound(slot_id));
        }

        record_slot(&mut *tx, slot_id, HistoryChange::Updated).await?;

        let row: AssignmentSlotRow = sqlx::query_as("SELECT * FROM assignment_slots WHERE id = ?")
            .bind(slot_id.to_string())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        AssignmentSlot::try_from(row)
    }

    async fn history(&self, slot_id: Uuid) -> DomainResult<Vec<SlotHistoryEntry>> {
        let rows: Vec<SlotHistoryRow> =
            sqlx::query_as("SELECT * FROM slot_history WHERE id = ? ORDER BY history_id ASC")
                .bind(slot_id.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(SlotHistoryEntry::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteShiftDefinitionRepository, SqliteWorkerRoster,
    };
    use crate::domain::models::{ShiftDefinition, WorkerIdentity};
    use crate::domain::ports::ShiftDefinitionRepository;
    use chrono::NaiveDate;

    struct Fixture {
        slots: SqliteAssignmentSlotRepository,
        workers: SqliteWorkerRoster,
        shift: ShiftDefinition,
    }

    async fn setup() -> Fixture {
        let pool = create_migrated_test_pool().await.unwrap();
        let shifts = SqliteShiftDefinitionRepository::new(pool.clone());
        let shift =
            ShiftDefinition::unique("Inventory", NaiveDate::from_ymd_opt(2023, 2, 7).unwrap(), 3);
        shifts
            .create_with_slots(&shift, &AssignmentSlot::roster_for(&shift))
            .await
            .unwrap();

        Fixture {
            slots: SqliteAssignmentSlotRepository::new(pool.clone()),
            workers: SqliteWorkerRoster::new(pool),
            shift,
        }
    }

    async fn first_slot(fx: &Fixture) -> AssignmentSlot {
        fx.slots.list_for_shift(fx.shift.id).await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_list_for_shift_is_ordered_by_position() {
        let fx = setup().await;

        let slots = fx.slots.list_for_shift(fx.shift.id).await.unwrap();

        assert_eq!(slots.len(), 3);
        let positions: Vec<u16> = slots.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert!(slots.iter().all(|s| s.shift_definition_id == fx.shift.id));
    }

    #[tokio::test]
    async fn test_update_slot() {
        let fx = setup().await;
        let worker = WorkerIdentity::new("Ada");
        fx.workers.register(&worker).await.unwrap();
        let slot = first_slot(&fx).await;

        let update = SlotUpdate {
            assigned_worker_id: Some(Some(worker.id)),
            open_for_replacement: Some(true),
            notes: Some("keys at the bar".to_string()),
            ..Default::default()
        };
        let returned = fx.slots.update(slot.id, &update).await.unwrap();

        let retrieved = fx.slots.get(slot.id).await.unwrap().unwrap();
        assert_eq!(returned, retrieved);
        assert_eq!(retrieved.assigned_worker_id, Some(worker.id));
        assert!(retrieved.open_for_replacement);
        assert!(!retrieved.attended);
        assert_eq!(retrieved.notes, "keys at the bar");
        assert!(retrieved.updated_at >= slot.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_slot() {
        let fx = setup().await;
        let ghost = Uuid::new_v4();

        let result = fx.slots.update(ghost, &SlotUpdate::assign(None)).await;
        assert!(matches!(result, Err(DomainError::SlotNotFound(id)) if id == ghost));
        assert!(fx.slots.get(ghost).await.unwrap().is_none());
        assert!(fx.slots.history(ghost).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edits_to_different_fields_both_survive() {
        let fx = setup().await;
        let ada = WorkerIdentity::new("Ada");
        fx.workers.register(&ada).await.unwrap();
        let slot = first_slot(&fx).await;

        // Neither edit carries the field the other one writes
        let attend = SlotUpdate { attended: Some(true), ..Default::default() };
        let assign = SlotUpdate::assign(Some(ada.id));
        let (a, b) = tokio::join!(
            fx.slots.update(slot.id, &attend),
            fx.slots.update(slot.id, &assign)
        );
        a.unwrap();
        b.unwrap();

        let retrieved = fx.slots.get(slot.id).await.unwrap().unwrap();
        assert!(retrieved.attended);
        assert_eq!(retrieved.assigned_worker_id, Some(ada.id));
    }

    #[tokio::test]
    async fn test_same_field_last_write_wins() {
        let fx = setup().await;
        let ada = WorkerIdentity::new("Ada");
        let grace = WorkerIdentity::new("Grace");
        fx.workers.register(&ada).await.unwrap();
        fx.workers.register(&grace).await.unwrap();
        let slot = first_slot(&fx).await;

        fx.slots.update(slot.id, &SlotUpdate::assign(Some(ada.id))).await.unwrap();
        fx.slots.update(slot.id, &SlotUpdate::assign(Some(grace.id))).await.unwrap();

        let retrieved = fx.slots.get(slot.id).await.unwrap().unwrap();
        assert_eq!(retrieved.assigned_worker_id, Some(grace.id));
    }

    #[tokio::test]
    async fn test_history_tracks_assignments() {
        let fx = setup().await;
        let ada = WorkerIdentity::new("Ada");
        let grace = WorkerIdentity::new("Grace");
        fx.workers.register(&ada).await.unwrap();
        fx.workers.register(&grace).await.unwrap();
        let slot = first_slot(&fx).await;

        fx.slots.update(slot.id, &SlotUpdate::assign(Some(ada.id))).await.unwrap();
        let replacement = SlotUpdate {
            open_for_replacement: Some(true),
            replacement_worker_id: Some(Some(grace.id)),
            ..Default::default()
        };
        fx.slots.update(slot.id, &replacement).await.unwrap();
        let attended = SlotUpdate { attended: Some(true), ..Default::default() };
        fx.slots.update(slot.id, &attended).await.unwrap();

        let history = fx.slots.history(slot.id).await.unwrap();
        let changes: Vec<HistoryChange> = history.iter().map(|h| h.change).collect();
        assert_eq!(
            changes,
            vec![
                HistoryChange::Created,
                HistoryChange::Updated,
                HistoryChange::Updated,
                HistoryChange::Updated,
            ]
        );
        assert_eq!(history[0].slot.assigned_worker_id, None);
        assert_eq!(history[1].slot.assigned_worker_id, Some(ada.id));
        assert_eq!(history[2].slot.replacement_worker_id, Some(grace.id));
        assert!(!history[2].slot.attended);
        assert!(history[3].slot.attended);
        assert_eq!(history[3].slot.assigned_worker_id, Some(ada.id));
    }

    #[test]
    fn test_update_query_sets_only_present_columns() {
        let update = SlotUpdate { attended: Some(true), ..Default::default() };
        let (query, bindings) = build_update_query(&update, Utc::now());

        assert_eq!(
            query,
            "UPDATE assignment_slots SET updated_at = ?, attended = ? WHERE id = ?"
        );
        assert_eq!(bindings.len(), 2);

        let (query, _) = build_update_query(&SlotUpdate::assign(None), Utc::now());
        assert!(query.contains("assigned_worker_id = ?"));
        assert!(!query.contains("attended"));
        assert!(!query.contains("notes"));
    }
}
