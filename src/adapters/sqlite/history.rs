//! History snapshot writers shared by the SQLite repositories.
//!
//! Each writer copies the current row(s) into the matching history table
//! with a single `INSERT ... SELECT`, on the caller's connection so it joins
//! the caller's transaction.

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::HistoryChange;

const SHIFT_COLUMNS: &str = "id, title, kind, starting_date, ending_date, rotation_week, weekday, \
     starting_time, ending_time, required_worker_count, notes, created_at, updated_at";

const SLOT_COLUMNS: &str = "id, shift_definition_id, position, assigned_worker_id, attended, \
     replacement_worker_id, open_for_replacement, notes, updated_at";

pub(crate) async fn record_shift(
    conn: &mut SqliteConnection,
    shift_id: Uuid,
    change: HistoryChange,
) -> DomainResult<()> {
    let query = format!(
        "INSERT INTO shift_definition_history ({cols}, change_type, recorded_at) \
         SELECT {cols}, ?, ? FROM shift_definitions WHERE id = ?",
        cols = SHIFT_COLUMNS
    );
    sqlx::query(&query)
        .bind(change.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(shift_id.to_string())
        .execute(conn)
        .await?;
    Ok(())
}

pub(crate) async fn record_slot(
    conn: &mut SqliteConnection,
    slot_id: Uuid,
    change: HistoryChange,
) -> DomainResult<()> {
    let query = format!(
        "INSERT INTO slot_history ({cols}, change_type, recorded_at) \
         SELECT {cols}, ?, ? FROM assignment_slots WHERE id = ?",
        cols = SLOT_COLUMNS
    );
    sqlx::query(&query)
        .bind(change.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(slot_id.to_string())
        .execute(conn)
        .await?;
    Ok(())
}

/// Snapshot every slot of a definition at once.
pub(crate) async fn record_slots_of_shift(
    conn: &mut SqliteConnection,
    shift_id: Uuid,
    change: HistoryChange,
) -> DomainResult<()> {
    let query = format!(
        "INSERT INTO slot_history ({cols}, change_type, recorded_at) \
         SELECT {cols}, ?, ? FROM assignment_slots WHERE shift_definition_id = ? \
         ORDER BY position ASC",
        cols = SLOT_COLUMNS
    );
    sqlx::query(&query)
        .bind(change.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(shift_id.to_string())
        .execute(conn)
        .await?;
    Ok(())
}

pub(crate) fn parse_change(s: &str) -> DomainResult<HistoryChange> {
    HistoryChange::from_str(s)
        .ok_or_else(|| DomainError::SerializationError(format!("Invalid history change: {}", s)))
}
