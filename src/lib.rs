pub mod calendar;
pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod seed;
pub mod shell;
pub mod tracker;
pub mod tracking;

use crate::cli::Cli;
use crate::config::{AppConfig, LOG_FILE_NAME};
use crate::errors::{AppError, AppResult};
use crate::tracker::HabitTracker;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

pub use crate::errors::AppError as Error;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Opens the store named by the command line and runs its command.
/// Returns the text to print.
pub fn run(cli: Cli) -> AppResult<String> {
    let config = AppConfig::resolve(cli.data_dir, cli.db);
    if let Err(error) = init_tracing(&config.log_dir) {
        eprintln!("warning: file logging disabled: {}", error);
    }
    tracing::info!(data_dir = %config.data_dir.display(), db = %config.db_path.display(), "starting");

    let tracker = HabitTracker::open(&config).map_err(|error| {
        tracing::error!(error = %error, "failed to open habit store");
        error
    })?;

    let command = cli.command.unwrap_or_default();
    cli::execute(&tracker, command, cli.json).map_err(|error| {
        tracing::error!(error = %error, "command failed");
        error
    })
}

pub fn init_tracing(log_dir: &Path) -> AppResult<()> {
    std::fs::create_dir_all(log_dir).map_err(|error| AppError::Io(error.to_string()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}
