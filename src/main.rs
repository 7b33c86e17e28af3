//! Shiftplan CLI entry point.

use anyhow::Context;
use clap::Parser;

use shiftplan::cli::{commands, handle_error, Cli, Commands};
use shiftplan::infrastructure::config::ConfigLoader;
use shiftplan::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load().context("Failed to load configuration") {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err.context("Failed to initialize logging"), cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.json).await,
        Commands::Shift(args) => commands::shift::execute(args, &config, cli.json).await,
        Commands::Slot(args) => commands::slot::execute(args, &config, cli.json).await,
        Commands::Worker(args) => commands::worker::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
