//! Gatehouse Config - layered TOML configuration.
//!
//! Values are resolved from, lowest to highest precedence:
//!
//! 1. Embedded defaults (`defaults.toml`)
//! 2. System file (`/etc/gatehouse/config.toml`)
//! 3. User file (`~/.gatehouse/config.toml`)
//! 4. An explicit file passed by the caller
//! 5. `GATEHOUSE_*` environment variables, for fields no file set
//!
//! The merged result is validated before it is returned.
//!
//! # Secrets
//!
//! `crypto.credential_key` is omitted from `Debug`, `Serialize`, and
//! `config show` output.
//!
//! # Example
//!
//! ```rust
//! use gatehouse_config::Config;
//!
//! let config = Config::default();
//! assert_eq!(config.gate.qr_window_millis(), 30_000);
//! assert_eq!(config.history.max_limit, 500);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod loader;
mod merge;
mod show;
mod types;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::SYSTEM_CONFIG_PATH;
pub use merge::{ConfigLayer, FieldSources};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::{
    Config, CredentialStorage, CryptoSection, GateSection, HistorySection, LoggingSection,
    StorageSection,
};
pub use validate::MAX_QR_WINDOW_SECS;

impl Config {
    /// Load the layered configuration.
    ///
    /// `explicit` is merged last and must exist when given.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed, or if the
    /// merged configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, None)
    }

    /// Like [`load`](Self::load) but reads the user layer from
    /// `{home_dir}/config.toml` instead of `~/.gatehouse/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed, or if the
    /// merged configuration fails validation.
    pub fn load_with_home(
        explicit: Option<&std::path::Path>,
        home_dir: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(explicit, Some(home_dir))
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Validate this configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::ValidationError`] found.
    pub fn validate(&self) -> ConfigResult<()> {
        validate::validate(self)
    }
}
