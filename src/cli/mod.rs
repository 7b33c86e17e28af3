//! Command-line interface.

pub mod commands;
pub mod id_resolver;
pub mod output;
pub mod table;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

use crate::adapters::sqlite::{initialize_database, PoolConfig};
use crate::domain::models::Config;

#[derive(Parser, Debug)]
#[command(name = "shiftplan")]
#[command(
    about = "Shift rota: rotation-week shifts, one-off shifts and worker assignments",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the project directory, default config and database
    Init(commands::init::InitArgs),

    /// Create, list and edit shifts
    Shift(commands::shift::ShiftArgs),

    /// Edit roster seats
    Slot(commands::slot::SlotArgs),

    /// Manage the worker roster
    Worker(commands::worker::WorkerArgs),
}

/// Open the configured database, applying pending migrations.
pub async fn open_database(config: &Config) -> Result<SqlitePool> {
    initialize_database(&config.database.url(), Some(PoolConfig::from(&config.database)))
        .await
        .with_context(|| {
            format!(
                "Failed to open database at {}. Run 'shiftplan init' first.",
                config.database.path
            )
        })
}

/// Report a failed command and exit with a non-zero status.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{:#}", err) });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {:#}", err);
    }
    std::process::exit(1);
}
