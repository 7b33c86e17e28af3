//! Implementation of the `shiftplan init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::initialize_database;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::config_dir;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force reinitialization even if already initialized
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub config_written: bool,
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push("\nWrote .shiftplan/config.yaml".to_string());
        }
        if self.database_initialized {
            lines.push("Database initialized at .shiftplan/shiftplan.db".to_string());
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let project_dir = config_dir(&target_path);

    if project_dir.exists() && !args.force {
        let out = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to reinitialize.".to_string(),
            initialized_path: target_path,
            config_written: false,
            database_initialized: false,
        };
        output(&out, json_mode);
        return Ok(());
    }

    if args.force && project_dir.exists() {
        fs::remove_dir_all(&project_dir)
            .await
            .context("Failed to remove existing .shiftplan directory")?;
    }

    fs::create_dir_all(&project_dir)
        .await
        .with_context(|| format!("Failed to create {}", project_dir.display()))?;

    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).context("Failed to serialize default config")?;
    fs::write(project_dir.join("config.yaml"), yaml)
        .await
        .context("Failed to write config.yaml")?;

    let db_path = project_dir.join("shiftplan.db");
    let db_url = format!("sqlite:{}", db_path.display());
    let pool = initialize_database(&db_url, None)
        .await
        .context("Failed to initialize database")?;
    pool.close().await;

    tracing::info!(path = %target_path.display(), "project initialized");

    let out = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path,
        config_written: true,
        database_initialized: true,
    };
    output(&out, json_mode);
    Ok(())
}
