//! Worker roster CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::adapters::sqlite::SqliteWorkerRoster;
use crate::cli::open_database;
use crate::cli::output::{output, ActionOutput, CommandOutput};
use crate::cli::table::TableFormatter;
use crate::domain::models::{Config, WorkerIdentity};

#[derive(Args, Debug)]
pub struct WorkerArgs {
    #[command(subcommand)]
    pub command: WorkerCommands,
}

#[derive(Subcommand, Debug)]
pub enum WorkerCommands {
    /// Add a worker to the roster
    Add {
        /// Display name
        name: String,

        /// Participation points carried over from elsewhere
        #[arg(long, default_value = "0")]
        points: i64,
    },

    /// List all workers
    List,
}

#[derive(Debug, serde::Serialize)]
pub struct WorkerListOutput {
    pub workers: Vec<WorkerIdentity>,
    pub total: usize,
}

impl CommandOutput for WorkerListOutput {
    fn to_human(&self) -> String {
        if self.workers.is_empty() {
            return "No workers found.".to_string();
        }
        TableFormatter::new().format_workers(&self.workers)
    }
}

pub async fn execute(args: WorkerArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(config).await?;
    let roster = SqliteWorkerRoster::new(pool);

    match args.command {
        WorkerCommands::Add { name, points } => {
            let worker = WorkerIdentity::new(name).with_points(points);
            roster.register(&worker).await?;
            let message = format!("Added worker '{}'\nID: {}", worker.display_name, worker.id);
            output(&ActionOutput::ok(message), json_mode);
        }
        WorkerCommands::List => {
            let workers = roster.list().await?;
            let out = WorkerListOutput {
                total: workers.len(),
                workers,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
