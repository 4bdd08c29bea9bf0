// rclone-bucket-backup/src/sync/mod.rs
pub(crate) mod bucket_filter;
pub(crate) mod bucket_list;
pub(crate) mod logic;
pub(crate) mod rclone_sync;

pub use logic::RunOutcome;

use crate::config::AppConfig;
use crate::utils::run_log::RunLog;

/// Public entry point for one backup run.
pub async fn run_sync_flow(app_config: &AppConfig, log: &mut RunLog) -> RunOutcome {
    logic::perform_sync_orchestration(app_config, log).await
}
