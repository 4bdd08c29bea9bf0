// rclone-bucket-backup/src/sync/bucket_list.rs
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::errors::{Result, SyncError};

/// Extracts the bucket name from one line of `rclone lsd` output.
///
/// `lsd` prints size, date, time and count columns before the name, so the
/// name is the last whitespace separated field.
pub fn parse_bucket_line(line: &str) -> Option<&str> {
    line.split_whitespace().last()
}

/// Runs `rclone lsd <remote>:` and returns the bucket names in listing order.
///
/// Stdout is consumed line by line while the command runs. Names read before
/// a non-zero exit are discarded.
pub async fn list_buckets(rclone_path: &Path, remote: &str) -> Result<Vec<String>> {
    let target = format!("{}:", remote);
    debug!("Running {} lsd {}", rclone_path.display(), target);

    let mut child = Command::new(rclone_path)
        .arg("lsd")
        .arg(&target)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SyncError::Spawn {
            program: rclone_path.display().to_string(),
            source,
        })?;

    let stdout = child.stdout.take().ok_or_else(|| {
        SyncError::Io(std::io::Error::other("stdout of rclone lsd was not captured"))
    })?;
    let mut stderr = child.stderr.take().ok_or_else(|| {
        SyncError::Io(std::io::Error::other("stderr of rclone lsd was not captured"))
    })?;

    let read_names = async {
        let mut names = Vec::new();
        // Byte lines: one undecodable name must not lose the rest of the listing.
        let mut lines = BufReader::new(stdout).split(b'\n');
        while let Some(raw) = lines.next_segment().await? {
            let line = String::from_utf8_lossy(&raw);
            if let Some(name) = parse_bucket_line(&line) {
                names.push(name.to_string());
            }
        }
        Ok::<_, std::io::Error>(names)
    };
    let read_errors = async {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await?;
        Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
    };

    let (names, error_text) = tokio::join!(read_names, read_errors);
    let status = child.wait().await?;
    let names = names?;
    let error_text = error_text?;

    if !status.success() {
        return Err(SyncError::Command {
            status,
            stderr: error_text.trim().to_string(),
        });
    }

    debug!("rclone lsd returned {} bucket(s)", names.len());
    Ok(names)
}
