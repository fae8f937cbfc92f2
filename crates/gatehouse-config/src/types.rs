//! Configuration types for Gatehouse.
//!
//! These types have no dependencies on other gatehouse crates; the binary
//! converts them into engine settings at startup. Every struct implements
//! [`Default`] with the same values as the embedded `defaults.toml`, so a bare
//! `[section]` header produces a working configuration.

use std::path::PathBuf;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credential key and at-rest representation.
    pub crypto: CryptoSection,
    /// Gate verification settings.
    pub gate: GateSection,
    /// History windows and row limits.
    pub history: HistorySection,
    /// Persistent store location.
    pub storage: StorageSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// CryptoSection
// ---------------------------------------------------------------------------

/// How credential identifiers are held at rest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStorage {
    /// Identifiers are sealed with the credential key.
    #[default]
    Sealed,
    /// Identifiers are raw strings.
    Plaintext,
}

/// Credential key material.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CryptoSection {
    /// AES-256 key as 64 hex characters. Prefer `GATEHOUSE_CREDENTIAL_KEY`
    /// over storing this in a file.
    pub credential_key: Option<String>,
    /// At-rest representation of credential identifiers.
    pub credential_storage: CredentialStorage,
}

impl std::fmt::Debug for CryptoSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoSection")
            .field("has_credential_key", &self.credential_key.is_some())
            .field("credential_storage", &self.credential_storage)
            .finish()
    }
}

impl Serialize for CryptoSection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CryptoSection", 1)?;
        // credential_key is never written back out.
        state.serialize_field("credential_storage", &self.credential_storage)?;
        state.end()
    }
}

// ---------------------------------------------------------------------------
// GateSection
// ---------------------------------------------------------------------------

/// Gate verification settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSection {
    /// Dynamic QR freshness window in seconds.
    pub qr_window_secs: u64,
}

impl GateSection {
    /// The freshness window in milliseconds.
    #[must_use]
    pub fn qr_window_millis(&self) -> u64 {
        self.qr_window_secs.saturating_mul(1_000)
    }
}

impl Default for GateSection {
    fn default() -> Self {
        Self { qr_window_secs: 30 }
    }
}

// ---------------------------------------------------------------------------
// HistorySection
// ---------------------------------------------------------------------------

/// History query windows and limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySection {
    /// Default window for admin history, in days.
    pub window_days: u32,
    /// Default window for personal history, in days.
    pub personal_window_days: u32,
    /// Rows returned when the caller gives no limit.
    pub default_limit: usize,
    /// Upper bound on requested limits.
    pub max_limit: usize,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            window_days: 7,
            personal_window_days: 30,
            default_limit: 50,
            max_limit: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Persistent store location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// SurrealKV directory. `None` uses the platform data directory.
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["gatehouse_gate=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
