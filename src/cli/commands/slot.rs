//! Slot CLI commands: assignment, replacement and attendance edits.

use anyhow::Result;
use clap::{Args, Subcommand};
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::sqlite::{SqliteAssignmentSlotRepository, SqliteWorkerRoster};
use crate::cli::id_resolver::{resolve_slot_id, resolve_worker_id};
use crate::cli::open_database;
use crate::cli::output::{output, short_id, CommandOutput};
use crate::domain::models::{AssignmentSlot, Config, SlotHistoryEntry, SlotUpdate};
use crate::services::AssignmentService;

#[derive(Args, Debug)]
pub struct SlotArgs {
    #[command(subcommand)]
    pub command: SlotCommands,
}

#[derive(Subcommand, Debug)]
pub enum SlotCommands {
    /// Edit one roster seat; only the given fields change
    Update {
        /// Slot ID or unique prefix
        id: String,

        /// Worker to put in the seat (ID or prefix)
        #[arg(long, conflicts_with = "clear_worker")]
        worker: Option<String>,

        /// Empty the seat
        #[arg(long)]
        clear_worker: bool,

        /// Mark the seat as looking for a replacement
        #[arg(long, conflicts_with = "closed")]
        open: bool,

        /// Withdraw the replacement request
        #[arg(long)]
        closed: bool,

        /// Worker standing in (ID or prefix)
        #[arg(long, conflicts_with = "clear_replacement")]
        replacement: Option<String>,

        #[arg(long)]
        clear_replacement: bool,

        /// Whether the shift was attended
        #[arg(long)]
        attended: Option<bool>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show who held a seat over time, including after the shift was deleted
    History {
        /// Full slot ID, or a unique prefix of an existing slot
        id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct SlotOutput {
    pub slot: AssignmentSlot,
}

impl CommandOutput for SlotOutput {
    fn to_human(&self) -> String {
        let s = &self.slot;
        let worker = |id: Option<Uuid>| id.map_or_else(|| "-".to_string(), |id| id.to_string());
        [
            format!("Slot {} updated", short_id(&s.id)),
            format!("  Worker: {}", worker(s.assigned_worker_id)),
            format!("  Open for replacement: {}", s.open_for_replacement),
            format!("  Replacement: {}", worker(s.replacement_worker_id)),
            format!("  Attended: {}", s.attended),
        ]
        .join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct SlotHistoryOutput {
    pub history: Vec<SlotHistoryEntry>,
}

impl CommandOutput for SlotHistoryOutput {
    fn to_human(&self) -> String {
        let worker = |id: Option<Uuid>| id.map_or_else(|| "-".to_string(), |id| short_id(&id));
        self.history
            .iter()
            .map(|entry| {
                format!(
                    "{}  {:<8} worker={} replacement={} open={} attended={}",
                    entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.change.as_str(),
                    worker(entry.slot.assigned_worker_id),
                    worker(entry.slot.replacement_worker_id),
                    entry.slot.open_for_replacement,
                    entry.slot.attended
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub async fn execute(args: SlotArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(config).await?;

    let service = AssignmentService::new(
        Arc::new(SqliteAssignmentSlotRepository::new(pool.clone())),
        Arc::new(SqliteWorkerRoster::new(pool.clone())),
    );

    match args.command {
        SlotCommands::Update {
            id,
            worker,
            clear_worker,
            open,
            closed,
            replacement,
            clear_replacement,
            attended,
            notes,
        } => {
            let slot_id = resolve_slot_id(&pool, &id).await?;

            let update = SlotUpdate {
                assigned_worker_id: worker_change(&pool, worker, clear_worker).await?,
                open_for_replacement: match (open, closed) {
                    (true, _) => Some(true),
                    (false, true) => Some(false),
                    (false, false) => None,
                },
                replacement_worker_id: worker_change(&pool, replacement, clear_replacement).await?,
                attended,
                notes,
            };

            if update.is_empty() {
                anyhow::bail!("Nothing to update. See 'shiftplan slot update --help'.");
            }

            let slot = service.update_slot(slot_id, update).await?;
            output(&SlotOutput { slot }, json_mode);
        }

        SlotCommands::History { id } => {
            let slot_id = match Uuid::parse_str(&id) {
                Ok(id) => id,
                Err(_) => resolve_slot_id(&pool, &id).await?,
            };
            let history = service.slot_history(slot_id).await?;
            output(&SlotHistoryOutput { history }, json_mode);
        }
    }

    Ok(())
}

async fn worker_change(
    pool: &SqlitePool,
    prefix: Option<String>,
    clear: bool,
) -> Result<Option<Option<Uuid>>> {
    match (prefix, clear) {
        (Some(prefix), _) => Ok(Some(Some(resolve_worker_id(pool, &prefix).await?))),
        (None, true) => Ok(Some(None)),
        (None, false) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::HistoryChange;
    use chrono::Utc;

    #[test]
    fn test_history_output_lists_each_change() {
        let mut slot = AssignmentSlot::empty(Uuid::new_v4(), 0);
        let created = SlotHistoryEntry {
            history_id: 1,
            change: HistoryChange::Created,
            recorded_at: Utc::now(),
            slot: slot.clone(),
        };
        slot.attended = true;
        let updated = SlotHistoryEntry {
            history_id: 2,
            change: HistoryChange::Updated,
            recorded_at: Utc::now(),
            slot,
        };

        let out = SlotHistoryOutput { history: vec![created, updated] };
        let human = out.to_human();
        let lines: Vec<&str> = human.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("created") && lines[0].contains("attended=false"));
        assert!(lines[1].contains("updated") && lines[1].contains("attended=true"));
        assert_eq!(out.to_json()["history"][1]["change"], serde_json::json!("updated"));
    }
}
