//! Binary entry point: parse configuration, route logs to a file so they do
//! not fight the TUI for the terminal, open the database, and run the UI.
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use school_manager::{open_database, run_app, App, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::parse();
    let db_path = config.resolved_db_path()?;
    init_tracing(&config.resolved_log_path()?, &config.log_level)?;

    info!(db = %db_path.display(), "starting school manager");
    let conn = open_database(&db_path)?;
    let mut app = App::new(conn)?;
    run_app(&mut app)?;
    info!("school manager exited");
    Ok(())
}

/// Install a plain-text subscriber appending to `log_path`. `RUST_LOG` wins
/// over `default_level` when set.
fn init_tracing(log_path: &Path, default_level: &str) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create log directory")?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
