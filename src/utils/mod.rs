pub mod run_log;

use std::path::PathBuf;
use which::which;

use crate::errors::{Result, SyncError};

/// Finds the rclone executable, either on PATH or at the configured path.
pub fn find_rclone_executable(name: &str) -> Result<PathBuf> {
    which(name).map_err(|source| SyncError::ExecutableNotFound {
        name: name.to_string(),
        source,
    })
}
