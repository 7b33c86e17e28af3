//! SQLite database adapters for the shift rota.

pub mod connection;
mod history;
pub mod migrations;
pub mod shift_repository;
pub mod slot_repository;
pub mod worker_roster;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use shift_repository::SqliteShiftDefinitionRepository;
pub use slot_repository::SqliteAssignmentSlotRepository;
pub use worker_roster::SqliteWorkerRoster;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Storage format of calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format of wall-clock times.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Parse a UUID string from a SQLite row field.
pub fn parse_uuid(s: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an optional UUID string from a SQLite row field.
pub fn parse_optional_uuid(s: Option<String>) -> DomainResult<Option<Uuid>> {
    s.map(|s| Uuid::parse_str(&s))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an ISO date string from a SQLite row field.
pub fn parse_date(s: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DomainError::SerializationError(format!("date '{}': {}", s, e)))
}

/// Parse an optional ISO date string from a SQLite row field.
pub fn parse_optional_date(s: Option<String>) -> DomainResult<Option<NaiveDate>> {
    s.map(|s| parse_date(&s)).transpose()
}

/// Parse an optional time string from a SQLite row field.
pub fn parse_optional_time(s: Option<String>) -> DomainResult<Option<NaiveTime>> {
    s.map(|s| {
        NaiveTime::parse_from_str(&s, TIME_FORMAT)
            .map_err(|e| DomainError::SerializationError(format!("time '{}': {}", s, e)))
    })
    .transpose()
}

/// A value bound into a dynamically assembled query.
pub(crate) enum Bind {
    Text(String),
    OptionalText(Option<String>),
    Int(i64),
    Bool(bool),
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

pub async fn initialize_database(
    database_url: &str,
    config: Option<PoolConfig>,
) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    let migrator = Migrator::new(pool.clone());
    let applied = migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    if applied > 0 {
        tracing::info!(applied, database_url, "applied schema migrations");
    }
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
