//! V2Scope Common Library
//!
//! Shared types and utilities for the V2Scope dashboard:
//!
//! - [`exposition`] - Prometheus-style text format parser (`Sample`, `TrafficSample`)
//! - [`snapshot`] - Flattened point-in-time metric snapshots
//! - [`history`] - Bounded 30-minute retention buffer
//! - [`config`] - Configuration loading and persistence (JSON5 format)
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod exposition;
pub mod history;
pub mod snapshot;

// Re-export commonly used types at the crate root
pub use config::{
    DEFAULT_ENDPOINT, DashboardConfig, LogFormat, LoggingConfig, default_config_path, load_config,
    parse_config,
};
pub use error::{Error, Result};
pub use exposition::{ParseError, Sample, TrafficSample, parse_line, parse_traffic_line};
pub use history::{HistoryStore, RETENTION_WINDOW_MS};
pub use snapshot::{Snapshot, current_timestamp_millis};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
