//! Port for the worker roster collaborator.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::WorkerIdentity;

/// Resolves worker identities. Owned by the membership side of the system.
#[async_trait]
pub trait WorkerRoster: Send + Sync {
    /// Look up a worker; `None` when the id is unknown.
    async fn resolve(&self, worker_id: Uuid) -> DomainResult<Option<WorkerIdentity>>;
}
