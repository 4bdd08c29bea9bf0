// rclone-bucket-backup/src/sync/logic.rs
use chrono::Local;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::sync::bucket_filter::filter_selected;
use crate::sync::bucket_list::list_buckets;
use crate::sync::rclone_sync::sync_bucket;
use crate::utils::find_rclone_executable;
use crate::utils::run_log::RunLog;

pub const NOTHING_SELECTED_MESSAGE: &str = "No selected bucket found in the object store.";

/// How a run ended. Every variant is a normal process exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    ListingFailed,
    NothingSelected,
    Completed { synced: Vec<String>, failed: Vec<String> },
}

/// Lists, filters and mirrors the selected buckets one after another.
///
/// 1. Resolves the rclone executable.
/// 2. Lists the buckets on the source remote. A failure ends the run here.
/// 3. Keeps the allow-listed names, in listing order.
/// 4. Syncs each bucket. A failed bucket is logged and the loop moves on.
pub async fn perform_sync_orchestration(config: &AppConfig, log: &mut RunLog) -> RunOutcome {
    log.log_run_start(Local::now());

    let listed = match find_rclone_executable(&config.rclone_binary) {
        Ok(rclone_path) => {
            debug!("Found rclone executable at: {}", rclone_path.display());
            list_buckets(&rclone_path, &config.source_remote)
                .await
                .map(|names| (rclone_path, names))
        }
        Err(e) => Err(e),
    };

    let (rclone_path, listed) = match listed {
        Ok(found) => found,
        Err(e) => {
            log.log(&format!("❌ Failed to list buckets: {}", e));
            return RunOutcome::ListingFailed;
        }
    };

    let selected = filter_selected(&listed, &config.selected_buckets);
    info!(
        "{} bucket(s) listed, {} selected for sync",
        listed.len(),
        selected.len()
    );

    if selected.is_empty() {
        log.log(NOTHING_SELECTED_MESSAGE);
        return RunOutcome::NothingSelected;
    }

    let log_file = log.path().to_path_buf();
    let mut synced = Vec::new();
    let mut failed = Vec::new();

    for bucket in selected {
        log.log(&format!("Syncing {}...", bucket));
        match sync_bucket(&rclone_path, config, &bucket, &log_file).await {
            Ok(()) => {
                log.log(&format!("✅ {} synced successfully.", bucket));
                synced.push(bucket);
            }
            Err(e) => {
                log.log(&format!("❌ Failed to sync {}: {}", bucket, e));
                failed.push(bucket);
            }
        }
    }

    log.log(&format!(
        "Sync completed: {} succeeded, {} failed.",
        synced.len(),
        failed.len()
    ));
    RunOutcome::Completed { synced, failed }
}
