//! # Deed Telemetry
//!
//! Structured logging for the deed registry binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use deed_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // Workflow logs are now emitted
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DEED_SERVICE_NAME` | `deed-registry` | Service name attached to every log line |
//! | `DEED_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `DEED_JSON_LOGS` | `false` | Emit one JSON object per line |
//! | `DEED_CONSOLE_OUTPUT` | `true` | Write logs to stderr at all |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    Filter { filter: String, reason: String },

    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}
