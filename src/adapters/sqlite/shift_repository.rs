//! SQLite adapter for ShiftDefinitionRepository.

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::adapters::sqlite::history::{parse_change, record_shift, record_slots_of_shift};
use crate::adapters::sqlite::{
    format_date, format_time, parse_date, parse_datetime, parse_optional_date, parse_optional_time,
    parse_uuid, Bind,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AssignmentSlot, HistoryChange, RotationWeek, ShiftDefinition, ShiftHistoryEntry, ShiftKind,
    ShiftWeekday,
};
use crate::domain::ports::{ShiftCriteria, ShiftDefinitionRepository};

#[derive(Clone)]
pub struct SqliteShiftDefinitionRepository {
    pool: SqlitePool,
}

impl SqliteShiftDefinitionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ShiftDefinitionRow {
    id: String,
    title: String,
    kind: String,
    starting_date: String,
    ending_date: Option<String>,
    rotation_week: Option<String>,
    weekday: Option<String>,
    starting_time: Option<String>,
    ending_time: Option<String>,
    required_worker_count: i64,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ShiftDefinitionRow> for ShiftDefinition {
    type Error = DomainError;

    fn try_from(row: ShiftDefinitionRow) -> Result<Self, Self::Error> {
        let kind = ShiftKind::from_str(&row.kind).ok_or_else(|| {
            DomainError::SerializationError(format!("Invalid shift kind: {}", row.kind))
        })?;

        let required_worker_count = u16::try_from(row.required_worker_count).map_err(|_| {
            DomainError::SerializationError(format!(
                "Invalid required_worker_count: {}",
                row.required_worker_count
            ))
        })?;

        // Unrecognised recurrence columns decode as absent. The definition
        // stays listable and the expander skips it.
        let rotation_week = row.rotation_week.as_deref().and_then(RotationWeek::from_str);
        let weekday = row.weekday.as_deref().and_then(ShiftWeekday::from_str);

        Ok(ShiftDefinition {
            id: parse_uuid(&row.id)?,
            title: row.title,
            kind,
            starting_date: parse_date(&row.starting_date)?,
            ending_date: parse_optional_date(row.ending_date)?,
            rotation_week,
            weekday,
            starting_time: parse_optional_time(row.starting_time)?,
            ending_time: parse_optional_time(row.ending_time)?,
            required_worker_count,
            notes: row.notes,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ShiftHistoryRow {
    history_id: i64,
    id: String,
    title: String,
    kind: String,
    starting_date: String,
    ending_date: Option<String>,
    rotation_week: Option<String>,
    weekday: Option<String>,
    starting_time: Option<String>,
    ending_time: Option<String>,
    required_worker_count: i64,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
    change_type: String,
    recorded_at: String,
}

impl TryFrom<ShiftHistoryRow> for ShiftHistoryEntry {
    type Error = DomainError;

    fn try_from(row: ShiftHistoryRow) -> Result<Self, Self::Error> {
        let shift = ShiftDefinition::try_from(ShiftDefinitionRow {
            id: row.id,
            title: row.title,
            kind: row.kind,
            starting_date: row.starting_date,
            ending_date: row.ending_date,
            rotation_week: row.rotation_week,
            weekday: row.weekday,
            starting_time: row.starting_time,
            ending_time: row.ending_time,
            required_worker_count: row.required_worker_count,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })?;

        Ok(ShiftHistoryEntry {
            history_id: row.history_id,
            change: parse_change(&row.change_type)?,
            recorded_at: parse_datetime(&row.recorded_at)?,
            shift,
        })
    }
}

/// Unicode-aware case-insensitive substring test.
///
/// SQLite's `LOWER()` only folds ASCII, so title matching happens here
/// rather than in SQL.
fn title_matches(title: &str, needle: &str) -> bool {
    title.to_lowercase().contains(&needle.to_lowercase())
}

/// Build the WHERE clause for `criteria`. The title criterion is not part of
/// the SQL; see [`title_matches`].
fn build_list_query(criteria: &ShiftCriteria) -> (String, Vec<Bind>) {
    let mut query = String::from("SELECT * FROM shift_definitions WHERE 1=1");
    let mut bindings = Vec::new();

    if let Some(kind) = criteria.kind {
        query.push_str(" AND kind = ?");
        bindings.push(Bind::Text(kind.as_str().to_string()));
    }
    if let Some(week) = criteria.rotation_week {
        query.push_str(" AND rotation_week = ?");
        bindings.push(Bind::Text(week.as_str().to_string()));
    }
    if let Some(day) = criteria.weekday {
        query.push_str(" AND weekday = ?");
        bindings.push(Bind::Text(day.as_str().to_string()));
    }
    if let Some(time) = criteria.starting_time {
        query.push_str(" AND starting_time = ?");
        bindings.push(Bind::Text(format_time(time)));
    }
    if let Some(time) = criteria.ending_time {
        query.push_str(" AND ending_time = ?");
        bindings.push(Bind::Text(format_time(time)));
    }
    if let Some(count) = criteria.required_worker_count {
        query.push_str(" AND required_worker_count = ?");
        bindings.push(Bind::Int(i64::from(count)));
    }
    if let Some(ref notes) = criteria.notes {
        query.push_str(" AND notes = ?");
        bindings.push(Bind::Text(notes.clone()));
    }
    if let Some(date) = criteria.starting_on_or_after {
        query.push_str(" AND starting_date >= ?");
        bindings.push(Bind::Text(format_date(date)));
    }
    if let Some(date) = criteria.starting_on_or_before {
        query.push_str(" AND starting_date <= ?");
        bindings.push(Bind::Text(format_date(date)));
    }
    if let Some(date) = criteria.starting_before {
        query.push_str(" AND starting_date < ?");
        bindings.push(Bind::Text(format_date(date)));
    }

    query.push_str(" ORDER BY starting_date ASC, id ASC");
    (query, bindings)
}

async fn insert_slot(conn: &mut SqliteConnection, slot: &AssignmentSlot) -> DomainResult<()> {
    sqlx::query(
        r#"INSERT INTO assignment_slots (id, shift_definition_id, position, assigned_worker_id,
           attended, replacement_worker_id, open_for_replacement, notes, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(slot.id.to_string())
    .bind(slot.shift_definition_id.to_string())
    .bind(i64::from(slot.position))
    .bind(slot.assigned_worker_id.map(|id| id.to_string()))
    .bind(slot.attended)
    .bind(slot.replacement_worker_id.map(|id| id.to_string()))
    .bind(slot.open_for_replacement)
    .bind(&slot.notes)
    .bind(slot.updated_at.to_rfc3339())
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl ShiftDefinitionRepository for SqliteShiftDefinitionRepository {
    async fn create_with_slots(
        &self,
        shift: &ShiftDefinition,
        slots: &[AssignmentSlot],
    ) -> DomainResult<()> {
        if let Some(stray) = slots.iter().find(|s| s.shift_definition_id != shift.id) {
            return Err(DomainError::ValidationFailed(format!(
                "slot {} does not belong to shift {}",
                stray.id, shift.id
            )));
        }

        // Dropping the transaction without commit rolls back the definition
        // together with any slots already inserted.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO shift_definitions (id, title, kind, starting_date, ending_date,
               rotation_week, weekday, starting_time, ending_time, required_worker_count,
               notes, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(shift.id.to_string())
        .bind(&shift.title)
        .bind(shift.kind.as_str())
        .bind(format_date(shift.starting_date))
        .bind(shift.ending_date.map(format_date))
        .bind(shift.rotation_week.map(|w| w.as_str()))
        .bind(shift.weekday.map(|d| d.as_str()))
        .bind(shift.starting_time.map(format_time))
        .bind(shift.ending_time.map(format_time))
        .bind(i64::from(shift.required_worker_count))
        .bind(&shift.notes)
        .bind(shift.created_at.to_rfc3339())
        .bind(shift.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for slot in slots {
            insert_slot(&mut *tx, slot).await?;
        }

        record_shift(&mut *tx, shift.id, HistoryChange::Created).await?;
        record_slots_of_shift(&mut *tx, shift.id, HistoryChange::Created).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<ShiftDefinition>> {
        let row: Option<ShiftDefinitionRow> =
            sqlx::query_as("SELECT * FROM shift_definitions WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(ShiftDefinition::try_from).transpose()
    }

    async fn update(&self, shift: &ShiftDefinition) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"UPDATE shift_definitions SET title = ?, kind = ?, starting_date = ?,
               ending_date = ?, rotation_week = ?, weekday = ?, starting_time = ?,
               ending_time = ?, notes = ?, updated_at = ?
               WHERE id = ?"#,
        )
        .bind(&shift.title)
        .bind(shift.kind.as_str())
        .bind(format_date(shift.starting_date))
        .bind(shift.ending_date.map(format_date))
        .bind(shift.rotation_week.map(|w| w.as_str()))
        .bind(shift.weekday.map(|d| d.as_str()))
        .bind(shift.starting_time.map(format_time))
        .bind(shift.ending_time.map(format_time))
        .bind(&shift.notes)
        .bind(shift.updated_at.to_rfc3339())
        .bind(shift.id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ShiftNotFound(shift.id));
        }

        record_shift(&mut *tx, shift.id, HistoryChange::Updated).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        // Snapshot before the cascade removes the slots
        record_shift(&mut *tx, id, HistoryChange::Deleted).await?;
        record_slots_of_shift(&mut *tx, id, HistoryChange::Deleted).await?;

        let result = sqlx::query("DELETE FROM shift_definitions WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ShiftNotFound(id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list(&self, criteria: &ShiftCriteria) -> DomainResult<Vec<ShiftDefinition>> {
        let (query, bindings) = build_list_query(criteria);
        tracing::debug!(%query, bindings = bindings.len(), "listing shift definitions");

        let mut q = sqlx::query_as::<_, ShiftDefinitionRow>(&query);
        for binding in bindings {
            q = match binding {
                Bind::Text(value) => q.bind(value),
                Bind::OptionalText(value) => q.bind(value),
                Bind::Int(value) => q.bind(value),
                Bind::Bool(value) => q.bind(value),
            };
        }

        let rows = q.fetch_all(&self.pool).await?;
        let mut shifts = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(ref needle) = criteria.title_contains {
                if !title_matches(&row.title, needle) {
                    continue;
                }
            }
            shifts.push(ShiftDefinition::try_from(row)?);
        }
        Ok(shifts)
    }

    async fn history(&self, id: Uuid) -> DomainResult<Vec<ShiftHistoryEntry>> {
        let rows: Vec<ShiftHistoryRow> = sqlx::query_as(
            "SELECT * FROM shift_definition_history WHERE id = ? ORDER BY history_id ASC",
        )
        .bind(id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ShiftHistoryEntry::try_from).collect()
    }
}
