//! Bridge from `gatehouse_config::Config` to engine and store types.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use gatehouse_audit::HistoryConfig;
use gatehouse_config::{Config, CredentialStorage, HistorySection};
use gatehouse_crypto::CredentialCipher;
use gatehouse_gate::{CredentialMode, GateEngine};
use gatehouse_storage::{KvGateStore, SurrealKvStore};
use gatehouse_telemetry::LogConfig;

/// Logging settings from the `[logging]` section.
pub(crate) fn to_log_config(cfg: &Config) -> anyhow::Result<LogConfig> {
    Ok(LogConfig::try_from(&cfg.logging)?)
}

/// History windows and limits from the `[history]` section.
pub(crate) fn to_history_config(section: &HistorySection) -> HistoryConfig {
    HistoryConfig {
        window_days: section.window_days,
        personal_window_days: section.personal_window_days,
        default_limit: section.default_limit,
        max_limit: section.max_limit,
    }
}

/// The credential cipher, if a key is configured.
pub(crate) fn cipher(cfg: &Config) -> anyhow::Result<Option<CredentialCipher>> {
    cfg.crypto
        .credential_key
        .as_deref()
        .map(CredentialCipher::from_hex)
        .transpose()
        .context("invalid crypto.credential_key")
}

/// The cipher, or an error explaining how to configure one.
pub(crate) fn require_cipher(cfg: &Config) -> anyhow::Result<CredentialCipher> {
    match cipher(cfg)? {
        Some(cipher) => Ok(cipher),
        None => bail!(
            "no credential key configured; run `gatehouse keygen` and set \
             GATEHOUSE_CREDENTIAL_KEY or crypto.credential_key"
        ),
    }
}

/// How the engine should treat stored credential identifiers.
pub(crate) fn credential_mode(cfg: &Config) -> anyhow::Result<CredentialMode> {
    match cfg.crypto.credential_storage {
        CredentialStorage::Sealed => Ok(CredentialMode::Sealed(require_cipher(cfg)?)),
        CredentialStorage::Plaintext => Ok(CredentialMode::Plaintext),
    }
}

/// SurrealKV directory: `storage.path`, else the platform data directory.
pub(crate) fn storage_path(cfg: &Config) -> anyhow::Result<PathBuf> {
    if let Some(path) = &cfg.storage.path {
        return Ok(path.clone());
    }
    let dirs = directories::ProjectDirs::from("", "", "gatehouse")
        .context("could not determine a data directory; set storage.path")?;
    Ok(dirs.data_dir().join("kv"))
}

/// An open persistent store.
pub(crate) struct OpenStore {
    pub(crate) kv: Arc<SurrealKvStore>,
    pub(crate) gate: Arc<KvGateStore>,
}

impl OpenStore {
    /// Flush and close the backend.
    pub(crate) async fn close(&self) -> anyhow::Result<()> {
        self.kv.close().await.context("failed to close store")
    }
}

/// Open the persistent store, creating its directory if needed.
pub(crate) fn open_store(cfg: &Config) -> anyhow::Result<OpenStore> {
    let path = storage_path(cfg)?;
    std::fs::create_dir_all(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let kv = Arc::new(
        SurrealKvStore::open(&path)
            .with_context(|| format!("failed to open store at {}", path.display()))?,
    );
    let gate = Arc::new(KvGateStore::new(kv.clone())?);
    tracing::debug!(path = %path.display(), "opened store");
    Ok(OpenStore { kv, gate })
}

/// An engine over `store` configured from `cfg`.
pub(crate) fn build_engine(cfg: &Config, store: &OpenStore) -> anyhow::Result<GateEngine> {
    Ok(GateEngine::builder(store.gate.clone())
        .credential_mode(credential_mode(cfg)?)
        .qr_window_millis(cfg.gate.qr_window_millis())
        .history_config(to_history_config(&cfg.history))
        .build())
}
