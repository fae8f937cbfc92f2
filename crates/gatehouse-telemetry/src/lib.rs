//! Gatehouse Telemetry - logging setup.
//!
//! This crate provides:
//! - [`LogConfig`] with level, format, target, and per-crate directives
//! - [`setup_logging`] installing a `tracing-subscriber` registry with an
//!   `EnvFilter` and a pretty, compact, JSON, or full formatter
//! - Rolling file output through `tracing-appender`
//!
//! With the `config` feature, a [`LogConfig`] can be built from the
//! `[logging]` section of `gatehouse-config`.
//!
//! # Example
//!
//! ```rust,no_run
//! use gatehouse_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), gatehouse_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("gatehouse_gate=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!(gate_id = "north-gate", "Gate online");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
