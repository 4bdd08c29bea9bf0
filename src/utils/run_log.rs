// rclone-bucket-backup/src/utils/run_log.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// `<dir>/<prefix>_<YYYY-MM-DD-HH-MM>.log`, one file per run.
pub fn log_file_path(dir: &Path, prefix: &str, now: DateTime<Local>) -> PathBuf {
    let timestamp = now.format("%Y-%m-%d-%H-%M");
    dir.join(format!("{}_{}.log", prefix, timestamp))
}

/// Append-only run log mirrored to the console.
///
/// The file is opened once and closed when the log is dropped. Each message
/// is flushed immediately because rclone appends to the same file between
/// our writes.
pub struct RunLog {
    path: PathBuf,
    file: File,
    console: Box<dyn Write>,
}

impl RunLog {
    /// Opens (or creates) the log file at `path`, mirroring to stdout.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_console(path, Box::new(io::stdout()))
    }

    pub fn with_console(path: &Path, console: Box<dyn Write>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        Ok(RunLog {
            path: path.to_path_buf(),
            file,
            console,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `msg` verbatim, newline terminated, to the console and the file.
    ///
    /// Write failures after the file has been opened are not fatal: the
    /// message is still attempted on the other sink.
    pub fn log(&mut self, msg: &str) {
        let _ = writeln!(self.console, "{}", msg);
        let _ = self.console.flush();

        if let Err(e) = writeln!(self.file, "{}", msg).and_then(|_| self.file.flush()) {
            tracing::warn!("Failed to write to {}: {}", self.path.display(), e);
        }
    }

    pub fn log_run_start(&mut self, now: DateTime<Local>) {
        self.log(&format!("=== {} ===", now.format("%Y-%m-%d %H:%M:%S %:z")));
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        let _ = self.file.flush();
        let _ = self.file.sync_all();
        let _ = self.console.flush();
    }
}
