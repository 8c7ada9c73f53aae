//! # Remote-SysRq Telemetry
//!
//! Logging bootstrap shared by every binary in the workspace.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rsq_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // Application code here
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RSQ_SERVICE_NAME` | `remote-sysrq` | Service name attached to log lines |
//! | `RSQ_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `RSQ_JSON_LOGS` | `false` | Emit one JSON object per line |
//! | `RSQ_CONSOLE_OUTPUT` | `true` | Write logs to stderr at all |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install global subscriber: {0}")]
    SubscriberInit(String),
}
