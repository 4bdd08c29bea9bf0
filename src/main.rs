//! Bucket backup runner
//!
//! Lists the buckets of an S3-compatible store through rclone and mirrors the
//! allow-listed ones to a backup remote, one after another.

// rclone-bucket-backup/src/main.rs
mod config;
mod errors;
mod sync;
mod utils;

use anyhow::{Context, Result};
use chrono::Local;
use config::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utils::run_log::{RunLog, log_file_path};

/// Main entry point. Exits 0 once the run log is open, whatever the run outcome.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let result = run_app().await;
    match &result {
        Ok(outcome) => info!("Run finished: {:?}", outcome),
        Err(e) => eprintln!("❌ Error: {:?}", e),
    }
    ExitCode::from(exit_status(&result))
}

/// Every run outcome is a success for the scheduler; failures are reported
/// in the run log. Only errors before the log is open exit non-zero.
fn exit_status(result: &Result<sync::RunOutcome>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

async fn run_app() -> Result<sync::RunOutcome> {
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    // Optional overrides next to the working directory, as with `cargo run`.
    let config_path = PathBuf::from("config.json");
    let app_config = AppConfig::load(&config_path).context(format!(
        "Failed to load application configuration from {}",
        config_path.display()
    ))?;

    let log_path = log_file_path(&app_config.log_dir, &app_config.log_file_prefix, Local::now());
    let mut run_log = RunLog::open(&log_path).context("Cannot open the run log")?;

    Ok(sync::run_sync_flow(&app_config, &mut run_log).await)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
