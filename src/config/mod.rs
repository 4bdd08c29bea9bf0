// rclone-bucket-backup/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Buckets mirrored when nothing overrides the allow-list.
pub const DEFAULT_SELECTED_BUCKETS: &[&str] =
    &["ente-photos", "ente-auth", "vaultwarden", "jellystat", "jellyfin"];

pub const DEFAULT_LOG_DIR: &str = "/var/log";
pub const DEFAULT_LOG_FILE_PREFIX: &str = "rclone_sync";

/// Environment variables holding a comma separated allow-list, in lookup order.
/// `BUCKETS_SELECIONADOS` is the name used by existing `.env` files.
pub const ENV_SELECTED_BUCKETS: &[&str] = &["SYNC_BUCKETS", "BUCKETS_SELECIONADOS"];
pub const ENV_LOG_DIR: &str = "LOG_DIR";

// Optional overrides read from config.json. Every field may be omitted.
// The allow-list is not configurable here, only through the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJsonConfig {
    pub rclone_binary: Option<String>,
    pub source_remote: Option<String>,
    pub destination_remote: Option<String>,
    pub destination_root: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub log_file_prefix: Option<String>,
    pub transfers: Option<u32>,
    pub checkers: Option<u32>,
    pub use_trash: Option<bool>,
    pub max_delete: Option<u64>,
    pub rclone_log_level: Option<String>,
}

/// Everything a run needs, built once in `main` and handed to each step.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub rclone_binary: String,
    pub source_remote: String,
    pub destination_remote: String,
    pub destination_root: String,
    pub selected_buckets: BTreeSet<String>,
    pub log_dir: PathBuf,
    pub log_file_prefix: String,
    pub transfers: u32,
    pub checkers: u32,
    pub use_trash: bool,
    pub max_delete: u64,
    pub rclone_log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            rclone_binary: "rclone".to_string(),
            source_remote: "minio".to_string(),
            destination_remote: "gdrive".to_string(),
            destination_root: "backups".to_string(),
            selected_buckets: DEFAULT_SELECTED_BUCKETS
                .iter()
                .map(|b| b.to_string())
                .collect(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
            transfers: 8,
            checkers: 8,
            use_trash: false,
            max_delete: 1000,
            rclone_log_level: "INFO".to_string(),
        }
    }
}

impl AppConfig {
    /// Compiled-in defaults, then `config_path` if it exists, then the environment.
    pub fn load(config_path: &Path) -> Result<Self> {
        let mut config = AppConfig::default();

        if config_path.exists() {
            let raw = load_raw_json(config_path)?;
            config.apply_json(raw);
            debug!("Applied overrides from {}", config_path.display());
        } else {
            debug!("No config file at {}, using built-in settings", config_path.display());
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_json(&mut self, raw: RawJsonConfig) {
        if let Some(v) = raw.rclone_binary {
            self.rclone_binary = v;
        }
        if let Some(v) = raw.source_remote {
            self.source_remote = v;
        }
        if let Some(v) = raw.destination_remote {
            self.destination_remote = v;
        }
        if let Some(v) = raw.destination_root {
            self.destination_root = v;
        }
        if let Some(v) = raw.log_dir {
            self.log_dir = v;
        }
        if let Some(v) = raw.log_file_prefix {
            self.log_file_prefix = v;
        }
        if let Some(v) = raw.transfers {
            self.transfers = v;
        }
        if let Some(v) = raw.checkers {
            self.checkers = v;
        }
        if let Some(v) = raw.use_trash {
            self.use_trash = v;
        }
        if let Some(v) = raw.max_delete {
            self.max_delete = v;
        }
        if let Some(v) = raw.rclone_log_level {
            self.rclone_log_level = v;
        }
    }

    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some((key, list)) = ENV_SELECTED_BUCKETS
            .iter()
            .copied()
            .find_map(|key| lookup(key).map(|list| (key, list)))
        {
            self.selected_buckets = parse_bucket_list(&list);
            debug!("Allow-list taken from {}", key);
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|d| !d.trim().is_empty()) {
            self.log_dir = PathBuf::from(dir.trim());
        }
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("rclone_binary", self.rclone_binary.as_str()),
            ("source_remote", self.source_remote.as_str()),
            ("destination_remote", self.destination_remote.as_str()),
            ("log_file_prefix", self.log_file_prefix.as_str()),
            ("rclone_log_level", self.rclone_log_level.as_str()),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }
        }
        if self.log_dir.as_os_str().is_empty() {
            anyhow::bail!("log_dir cannot be empty");
        }
        if self.transfers == 0 || self.checkers == 0 {
            anyhow::bail!("transfers and checkers must be at least 1");
        }
        Ok(())
    }
}

fn load_raw_json(config_path: &Path) -> Result<RawJsonConfig> {
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;
    serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse JSON from config file at {}",
            config_path.display()
        )
    })
}

/// Splits a comma separated list, trimming entries and dropping empty ones.
pub fn parse_bucket_list(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .map(|b| b.to_string())
        .collect()
}
