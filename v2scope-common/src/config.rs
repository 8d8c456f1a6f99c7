use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default metrics endpoint base URL.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:9550";

/// Refresh interval bounds in seconds.
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 1;
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 60;

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_auto_refresh() -> bool {
    true
}

fn default_refresh_interval() -> u64 {
    5
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Persisted dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the V2Ray metrics API, e.g. "http://localhost:9550".
    /// The collector appends `/scrape` and `/metrics` to it.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Whether to keep polling, or run exactly one collection cycle.
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,

    /// Seconds between poll cycles (clamped to 1–60).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            auto_refresh: default_auto_refresh(),
            refresh_interval_secs: default_refresh_interval(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON5 file; a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        load_config(path)
    }

    /// Persist to disk, creating parent directories as needed. The output
    /// is pretty-printed JSON, which is valid JSON5.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Refresh interval clamped to the allowed 1–60 second range.
    pub fn clamped_interval_secs(&self) -> u64 {
        self.refresh_interval_secs
            .clamp(MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS)
    }
}

/// Platform config file location, overridable with `V2SCOPE_CONFIG`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("V2SCOPE_CONFIG") {
        return PathBuf::from(path);
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("v2scope")
        .join("config.json5")
}

/// Load a configuration file in JSON5 format.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    json5::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}
