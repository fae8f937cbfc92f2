//! Prelude module - commonly used types for convenient import.
//!
//! ```rust
//! use gatehouse_config::prelude::*;
//! ```

pub use crate::{
    Config, ConfigError, ConfigLayer, ConfigResult, CredentialStorage, ResolvedConfig,
    ShowFormat,
};
