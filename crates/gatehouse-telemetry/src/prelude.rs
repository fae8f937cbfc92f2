//! Prelude module - commonly used types for convenient import.
//!
//! ```rust
//! use gatehouse_telemetry::prelude::*;
//! ```

pub use crate::{
    LogConfig, LogFormat, LogTarget, TelemetryError, TelemetryResult, setup_logging,
};
