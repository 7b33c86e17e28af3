//! SQLite-backed worker roster.
//!
//! Implements the `WorkerRoster` port over the local `workers` table so the
//! rota can run without the membership system attached.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::WorkerIdentity;
use crate::domain::ports::WorkerRoster;

#[derive(Clone)]
pub struct SqliteWorkerRoster {
    pool: SqlitePool,
}

impl SqliteWorkerRoster {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a worker to the roster.
    pub async fn register(&self, worker: &WorkerIdentity) -> DomainResult<()> {
        if worker.display_name.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "display_name cannot be empty".to_string(),
            ));
        }

        sqlx::query(
            "INSERT INTO workers (id, display_name, participation_points, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(worker.id.to_string())
        .bind(&worker.display_name)
        .bind(worker.participation_points)
        .bind(worker.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(worker_id = %worker.id, name = %worker.display_name, "worker registered");
        Ok(())
    }

    /// All workers ordered by display name.
    pub async fn list(&self) -> DomainResult<Vec<WorkerIdentity>> {
        let rows: Vec<WorkerRow> =
            sqlx::query_as("SELECT * FROM workers ORDER BY display_name ASC, id ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(WorkerIdentity::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct WorkerRow {
    id: String,
    display_name: String,
    participation_points: i64,
    created_at: String,
}

impl TryFrom<WorkerRow> for WorkerIdentity {
    type Error = DomainError;

    fn try_from(row: WorkerRow) -> Result<Self, Self::Error> {
        Ok(WorkerIdentity {
            id: parse_uuid(&row.id)?,
            display_name: row.display_name,
            participation_points: row.participation_points,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[async_trait]
impl WorkerRoster for SqliteWorkerRoster {
    async fn resolve(&self, worker_id: Uuid) -> DomainResult<Option<WorkerIdentity>> {
        let row: Option<WorkerRow> = sqlx::query_as("SELECT * FROM workers WHERE id = ?")
            .bind(worker_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(WorkerIdentity::try_from).transpose()
    }
}
