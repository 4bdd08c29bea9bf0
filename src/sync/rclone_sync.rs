// rclone-bucket-backup/src/sync/rclone_sync.rs
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::{Result, SyncError};

/// Arguments for mirroring one bucket from the object store to the backup remote.
pub fn build_sync_args(config: &AppConfig, bucket: &str, log_file: &Path) -> Vec<OsString> {
    let source = format!("{}:{}", config.source_remote, bucket);
    let destination = if config.destination_root.is_empty() {
        format!("{}:{}", config.destination_remote, bucket)
    } else {
        format!(
            "{}:{}/{}",
            config.destination_remote,
            config.destination_root.trim_end_matches('/'),
            bucket
        )
    };

    vec![
        "sync".into(),
        source.into(),
        destination.into(),
        format!("--transfers={}", config.transfers).into(),
        format!("--checkers={}", config.checkers).into(),
        format!("--drive-use-trash={}", config.use_trash).into(),
        "--max-delete".into(),
        config.max_delete.to_string().into(),
        "--log-file".into(),
        log_file.as_os_str().to_owned(),
        "--log-level".into(),
        config.rclone_log_level.clone().into(),
    ]
}

/// Runs `rclone sync` for a single bucket and waits for it to finish.
///
/// rclone writes its own progress into `log_file`; only stderr is captured
/// here so a failure can be reported with the tool's explanation.
pub async fn sync_bucket(
    rclone_path: &Path,
    config: &AppConfig,
    bucket: &str,
    log_file: &Path,
) -> Result<()> {
    let args = build_sync_args(config, bucket, log_file);
    debug!("Running {} {:?}", rclone_path.display(), args);

    let output = Command::new(rclone_path)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| SyncError::Spawn {
            program: rclone_path.display().to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(SyncError::Command {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_default_sync_args() {
        let config = AppConfig::default();
        let args = build_sync_args(
            &config,
            "ente-photos",
            Path::new("/var/log/rclone_sync_2025-01-01-00-00.log"),
        );

        assert_eq!(
            as_strings(&args),
            vec![
                "sync",
                "minio:ente-photos",
                "gdrive:backups/ente-photos",
                "--transfers=8",
                "--checkers=8",
                "--drive-use-trash=false",
                "--max-delete",
                "1000",
                "--log-file",
                "/var/log/rclone_sync_2025-01-01-00-00.log",
                "--log-level",
                "INFO",
            ]
        );
    }

    #[test]
    fn test_sync_args_follow_config() {
        let config = AppConfig {
            source_remote: "s3".to_string(),
            destination_remote: "b2".to_string(),
            destination_root: "mirror/".to_string(),
            transfers: 2,
            checkers: 4,
            use_trash: true,
            max_delete: 10,
            rclone_log_level: "DEBUG".to_string(),
            ..AppConfig::default()
        };
        let args = as_strings(&build_sync_args(&config, "jellyfin", Path::new("run.log")));

        assert_eq!(args[1], "s3:jellyfin");
        assert_eq!(args[2], "b2:mirror/jellyfin");
        assert_eq!(args[3], "--transfers=2");
        assert_eq!(args[4], "--checkers=4");
        assert_eq!(args[5], "--drive-use-trash=true");
        assert_eq!(args[7], "10");
        assert_eq!(args[11], "DEBUG");
    }

    #[test]
    fn test_empty_destination_root() {
        let config = AppConfig {
            destination_root: String::new(),
            ..AppConfig::default()
        };
        let args = as_strings(&build_sync_args(&config, "jellystat", Path::new("run.log")));
        assert_eq!(args[2], "gdrive:jellystat");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_carries_stderr() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir()?;
        let rclone = dir.path().join("rclone");
        std::fs::write(
            &rclone,
            "#!/bin/sh\n[ \"$2\" = \"minio:ok\" ] && exit 0\necho \"quota exceeded\" >&2\nexit 7\n",
        )?;
        std::fs::set_permissions(&rclone, std::fs::Permissions::from_mode(0o755))?;
        let config = AppConfig::default();
        let log_file = dir.path().join("run.log");

        sync_bucket(&rclone, &config, "ok", &log_file).await?;

        let err = sync_bucket(&rclone, &config, "broken", &log_file)
            .await
            .unwrap_err();
        match err {
            SyncError::Command { status, stderr } => {
                assert_eq!(status.code(), Some(7));
                assert_eq!(stderr, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }
}
