//! # Bridge Telemetry
//!
//! Logging and metrics for the bridge relayer.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter`, human-readable or JSON
//! - **Metrics**: Prometheus counters in a dedicated registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RELAYER_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `RELAYER_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `RELAYER_SERVICE_NAME` | `bridge-relayer` | Service name |
//! | `RELAYER_LOG_SOURCE` | `false` | File / line in records |

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, FORKS_DETECTED, RELAY_CURSOR, RELAY_ERRORS, SCAN_WINDOWS,
    SNAPSHOTS_RECONCILED, TX_OUTCOMES,
};
pub use tracing_setup::init_tracing;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// Global subscriber could not be installed.
    #[error("Failed to initialize tracing: {0}")]
    TracingInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install the tracing subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_tracing(config)
}
