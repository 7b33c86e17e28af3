//! Short ID prefix resolution for CLI commands.
//!
//! Allows users to specify any unique prefix of a UUID instead of the full ID,
//! similar to git short hashes.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

const SHIFT_QUERY: &str = "SELECT id FROM shift_definitions WHERE id LIKE ? ORDER BY id";
const SLOT_QUERY: &str = "SELECT id FROM assignment_slots WHERE id LIKE ? ORDER BY id";
const WORKER_QUERY: &str = "SELECT id FROM workers WHERE id LIKE ? ORDER BY id";

/// Resolve a shift definition ID prefix to a full UUID.
pub async fn resolve_shift_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "shift", SHIFT_QUERY).await
}

/// Resolve an assignment slot ID prefix to a full UUID.
pub async fn resolve_slot_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "slot", SLOT_QUERY).await
}

/// Resolve a worker ID prefix to a full UUID.
pub async fn resolve_worker_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    resolve_prefix(pool, prefix, "worker", WORKER_QUERY).await
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        bail!("ID prefix must not be empty");
    }
    if !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        bail!(
            "Invalid ID prefix '{}': must contain only hex characters and dashes",
            prefix
        );
    }
    Ok(())
}

async fn resolve_prefix(
    pool: &SqlitePool,
    prefix: &str,
    entity: &str,
    query: &str,
) -> Result<Uuid> {
    // Full UUIDs skip the lookup; existence is checked by the service.
    if let Ok(uuid) = Uuid::parse_str(prefix) {
        return Ok(uuid);
    }

    validate_prefix(prefix)?;

    let pattern = format!("{}%", prefix.to_lowercase());
    let rows: Vec<(String,)> = sqlx::query_as(query).bind(&pattern).fetch_all(pool).await?;

    match rows.as_slice() {
        [] => bail!("No {} found matching '{}'", entity, prefix),
        [(id,)] => Ok(Uuid::parse_str(id)?),
        _ => {
            let mut msg =
                format!("Ambiguous prefix '{}': matches {} {}s:", prefix, rows.len(), entity);
            for (id,) in &rows {
                msg.push_str(&format!("\n  {}", id));
            }
            bail!("{}", msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteWorkerRoster};
    use crate::domain::models::WorkerIdentity;

    async fn insert_worker(roster: &SqliteWorkerRoster, id: &str, name: &str) {
        let mut worker = WorkerIdentity::new(name);
        worker.id = Uuid::parse_str(id).unwrap();
        roster.register(&worker).await.unwrap();
    }

    #[tokio::test]
    async fn test_resolve_unique_and_ambiguous_prefixes() {
        let pool = create_migrated_test_pool().await.unwrap();
        let roster = SqliteWorkerRoster::new(pool.clone());
        insert_worker(&roster, "abc12345-0000-4000-8000-000000000001", "Ada").await;
        insert_worker(&roster, "abc99999-0000-4000-8000-000000000002", "Grace").await;

        let id = resolve_worker_id(&pool, "abc1").await.unwrap();
        assert_eq!(id.to_string(), "abc12345-0000-4000-8000-000000000001");

        let err = resolve_worker_id(&pool, "abc").await.unwrap_err();
        assert!(err.to_string().contains("Ambiguous prefix"));

        let err = resolve_worker_id(&pool, "fff").await.unwrap_err();
        assert!(err.to_string().contains("No worker found"));
    }

    #[tokio::test]
    async fn test_invalid_prefix_is_rejected() {
        let pool = create_migrated_test_pool().await.unwrap();
        assert!(resolve_shift_id(&pool, "").await.is_err());
        assert!(resolve_shift_id(&pool, "zz%").await.is_err());
    }

    #[tokio::test]
    async fn test_full_uuid_passes_through() {
        let pool = create_migrated_test_pool().await.unwrap();
        let id = Uuid::new_v4();
        assert_eq!(resolve_slot_id(&pool, &id.to_string()).await.unwrap(), id);
    }
}
