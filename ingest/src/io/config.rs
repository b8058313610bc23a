//! Ingestion configuration (TOML).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::run_log::validate_timestamp_format;

pub const DEFAULT_LOG_PATH: &str = "prunt3d_ingest.log";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Ingestion configuration.
///
/// Missing fields default to the values the tool has always used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// Log file that every run outcome is appended to.
    pub log_path: PathBuf,

    /// Treat an empty (or whitespace-only) required file as a load failure.
    pub reject_empty_required: bool,

    /// `strftime` pattern for log line timestamps.
    pub timestamp_format: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            reject_empty_required: true,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.log_path.as_os_str().is_empty() {
            return Err(anyhow!("log_path must be non-empty"));
        }
        validate_timestamp_format(&self.timestamp_format)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `IngestConfig::default()`.
pub fn load_config(path: &Path) -> Result<IngestConfig> {
    if !path.exists() {
        let cfg = IngestConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: IngestConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
