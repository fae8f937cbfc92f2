//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `/etc/gatehouse/config.toml` (system)
//! 3. Merge `~/.gatehouse/config.toml` (user)
//! 4. Merge the explicit file, if one was given
//! 5. Apply env var fallbacks for fields no file set
//! 6. Deserialize merged tree → `Config`
//! 7. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves, set_path};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// System-wide config path.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/gatehouse/config.toml";

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// Supported `GATEHOUSE_*` fallbacks.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "GATEHOUSE_CREDENTIAL_KEY",
        field_path: "crypto.credential_key",
    },
    EnvMapping {
        var_name: "GATEHOUSE_STORAGE_PATH",
        field_path: "storage.path",
    },
    EnvMapping {
        var_name: "GATEHOUSE_LOG_LEVEL",
        field_path: "logging.level",
    },
];

/// Where to look for each file layer.
#[derive(Debug, Clone, Default)]
pub(crate) struct Sources {
    pub(crate) system: Option<PathBuf>,
    pub(crate) user: Option<PathBuf>,
    pub(crate) explicit: Option<PathBuf>,
}

/// Load the layered configuration from the standard locations.
///
/// `home_override` replaces the `.gatehouse` directory used for the user
/// layer. `explicit` is loaded last and must exist.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any file is unreadable, too large, or
/// malformed, or if the merged configuration fails validation.
pub(crate) fn load(explicit: Option<&Path>, home_override: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    let user = match home_override {
        Some(dir) => dir.join("config.toml"),
        None => home_directory()?.join(".gatehouse").join("config.toml"),
    };
    let sources = Sources {
        system: Some(PathBuf::from(SYSTEM_CONFIG_PATH)),
        user: Some(user),
        explicit: explicit.map(Path::to_path_buf),
    };
    load_from(&sources, &collect_env_vars())
}

pub(crate) fn load_from(
    sources: &Sources,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    let optional_layers = [
        (sources.system.as_deref(), ConfigLayer::System),
        (sources.user.as_deref(), ConfigLayer::User),
    ];
    for (path, layer) in optional_layers {
        let Some(path) = path else { continue };
        if let Some(overlay) = try_load_file(path)? {
            deep_merge_tracking(&mut merged, &overlay, "", &layer, &mut field_sources);
            loaded_files.push(path.display().to_string());
            info!(path = %path.display(), layer = %layer, "loaded config");
        }
    }

    if let Some(path) = sources.explicit.as_deref() {
        let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::Explicit,
            &mut field_sources,
        );
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded explicit config");
    }

    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub(crate) fn load_file(path: &Path) -> ConfigResult<Config> {
    let content = read_capped(path)?;
    let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match read_capped(path) {
        Ok(c) => c,
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => return Err(e),
    };

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Some(value))
}

/// Read a file in one operation and reject it if it exceeds the cap.
fn read_capped(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let size = content.len() as u64;
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::FileTooLarge {
            path: path.display().to_string(),
            size,
            limit: MAX_CONFIG_FILE_SIZE,
        });
    }
    Ok(content)
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("GATEHOUSE_"))
        .collect()
}

/// Fill fields that only hold their default from `GATEHOUSE_*` variables.
///
/// Env vars are a fallback, not an override: a value set by any file wins.
fn apply_env_fallbacks(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String>,
) -> usize {
    let mut applied = 0usize;
    for mapping in ENV_MAPPINGS {
        let Some(value) = env_vars.get(mapping.var_name) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let set_by_file = sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults);
        if set_by_file {
            continue;
        }
        set_path(merged, mapping.field_path, toml::Value::String(value.clone()));
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        // Values such as the credential key are not logged.
        debug!(var = mapping.var_name, field = mapping.field_path, "env fallback");
        applied = applied.saturating_add(1);
    }
    applied
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_defaults_only() {
        let resolved = load_from(&Sources::default(), &HashMap::new()).unwrap();
        assert_eq!(resolved.config, Config::default());
        assert!(resolved.loaded_files.is_empty());
        assert_eq!(
            resolved.field_sources.get("gate.qr_window_secs"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn test_layers_in_precedence_order() {
        let dir = tempfile::tempdir().unwrap();
        let system = write(dir.path(), "system.toml", "[gate]\nqr_window_secs = 60\n");
        let user = write(
            dir.path(),
            "user.toml",
            "[gate]\nqr_window_secs = 45\n[history]\nmax_limit = 200\n",
        );
        let explicit = write(dir.path(), "explicit.toml", "[history]\nmax_limit = 100\n");

        let sources = Sources {
            system: Some(system),
            user: Some(user),
            explicit: Some(explicit),
        };
        let resolved = load_from(&sources, &HashMap::new()).unwrap();
        assert_eq!(resolved.config.gate.qr_window_secs, 45);
        assert_eq!(resolved.config.history.max_limit, 100);
        assert_eq!(resolved.loaded_files.len(), 3);
        assert_eq!(
            resolved.field_sources.get("history.max_limit"),
            Some(&ConfigLayer::Explicit)
        );
    }

    #[test]
    fn test_missing_optional_layers_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let sources = Sources {
            system: Some(dir.path().join("absent.toml")),
            user: Some(dir.path().join("also-absent.toml")),
            explicit: None,
        };
        let resolved = load_from(&sources, &HashMap::new()).unwrap();
        assert!(resolved.loaded_files.is_empty());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sources = Sources {
            explicit: Some(dir.path().join("absent.toml")),
            ..Sources::default()
        };
        let result = load_from(&sources, &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_env_is_fallback_not_override() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = write(dir.path(), "c.toml", "[logging]\nlevel = \"warn\"\n");
        let vars = env(&[
            ("GATEHOUSE_LOG_LEVEL", "debug"),
            ("GATEHOUSE_STORAGE_PATH", "/srv/gatehouse"),
            ("GATEHOUSE_CREDENTIAL_KEY", &"a1".repeat(32)),
        ]);
        let sources = Sources {
            explicit: Some(explicit),
            ..Sources::default()
        };
        let resolved = load_from(&sources, &vars).unwrap();
        assert_eq!(resolved.config.logging.level, "warn");
        assert_eq!(
            resolved.config.storage.path.as_deref(),
            Some(Path::new("/srv/gatehouse"))
        );
        assert_eq!(resolved.config.crypto.credential_key, Some("a1".repeat(32)));
        assert_eq!(
            resolved.field_sources.get("storage.path"),
            Some(&ConfigLayer::Environment)
        );
    }

    #[test]
    fn test_env_overrides_default_value() {
        let vars = env(&[("GATEHOUSE_LOG_LEVEL", "debug")]);
        let resolved = load_from(&Sources::default(), &vars).unwrap();
        assert_eq!(resolved.config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_merged_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = write(dir.path(), "c.toml", "[gate]\nqr_window_secs = 0\n");
        let sources = Sources {
            explicit: Some(explicit),
            ..Sources::default()
        };
        let result = load_from(&sources, &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_malformed_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.toml", "[gate\n");
        assert!(matches!(load_file(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_oversized_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let data = format!("x = \"{}\"", "a".repeat(1_100_000));
        let path = write(dir.path(), "huge.toml", &data);
        assert!(matches!(
            try_load_file(&path),
            Err(ConfigError::FileTooLarge { .. })
        ));
    }
}
