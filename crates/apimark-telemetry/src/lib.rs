//! Logging infrastructure for apimark.
//!
//! Library crates emit `tracing` events tagged with an `event` field taken
//! from [`events`]; binaries call [`init_logging`] once at startup.
//!
//! # Usage
//!
//! ```ignore
//! use apimark_telemetry::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::new()
//!     .with_log_level("debug")
//!     .with_log_format(LogFormat::Pretty);
//!
//! init_logging(&config)?;
//! ```

pub mod config;
pub mod logging;

pub use config::{LogFormat, LoggingConfig};
pub use logging::{events, init_logging};

use thiserror::Error;

/// Telemetry errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),
}
