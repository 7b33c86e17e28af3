//! Domain errors for the shift rota engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur while managing shifts and their rosters.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Shift definition not found: {0}")]
    ShiftNotFound(Uuid),

    #[error("Assignment slot not found: {0}")]
    SlotNotFound(Uuid),

    #[error("Worker not found: {0}")]
    WorkerNotFound(Uuid),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl DomainError {
    /// Whether this error refers to a missing shift, slot or worker.
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ShiftNotFound(_) | Self::SlotNotFound(_) | Self::WorkerNotFound(_)
        )
    }

    /// Whether this error was caused by rejected input.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed(_))
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
