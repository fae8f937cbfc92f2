//! Source-annotated display for `config show`.

use std::fmt::{self, Write as _};

use crate::merge::FieldSources;
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config file paths that were loaded (in precedence order).
    pub loaded_files: Vec<String>,
}

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with inline comments showing source.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// Render the resolved config. The credential key is never included.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or `section` does not exist.
    pub fn show(&self, format: ShowFormat, section: Option<&str>) -> Result<String, fmt::Error> {
        let value = self.value(section)?;
        match format {
            ShowFormat::Toml => self.show_toml(&value, section),
            ShowFormat::Json => serde_json::to_string_pretty(&value).map_err(|_| fmt::Error),
        }
    }

    fn value(&self, section: Option<&str>) -> Result<toml::Value, fmt::Error> {
        let val = toml::Value::try_from(&self.config).map_err(|_| fmt::Error)?;
        match section {
            Some(name) => val
                .as_table()
                .and_then(|t| t.get(name))
                .cloned()
                .ok_or(fmt::Error),
            None => Ok(val),
        }
    }

    fn show_toml(&self, value: &toml::Value, section: Option<&str>) -> Result<String, fmt::Error> {
        let toml_str = toml::to_string_pretty(value).map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved Gatehouse Configuration\n");
        output.push_str("# Source annotations: [defaults] [system] [user] [explicit] [env]\n");

        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files (in precedence order):\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                writeln!(output, "#   {}. {path}", i.saturating_add(1))?;
            }
        }
        if self.config.crypto.credential_key.is_some() {
            output.push_str("#\n# crypto.credential_key is set (value hidden)\n");
        }
        output.push('\n');

        let mut table = section.unwrap_or("").to_owned();
        for line in toml_str.lines() {
            let trimmed = line.trim();
            if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
                table = match section {
                    Some(s) => format!("{s}.{header}"),
                    None => header.to_owned(),
                };
            }
            match self.annotate_line(trimmed, &table) {
                Some(layer) => writeln!(output, "{line}  # [{layer}]")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }

    fn annotate_line(&self, trimmed: &str, table: &str) -> Option<String> {
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }
        let key = trimmed.split('=').next()?.trim();
        let path = if table.is_empty() {
            key.to_owned()
        } else {
            format!("{table}.{key}")
        };
        self.field_sources.get(&path).map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ConfigLayer;

    fn resolved() -> ResolvedConfig {
        let mut config = Config::default();
        config.crypto.credential_key = Some("cd".repeat(32));
        let mut field_sources = FieldSources::new();
        field_sources.insert("gate.qr_window_secs".into(), ConfigLayer::Defaults);
        field_sources.insert("crypto.credential_key".into(), ConfigLayer::Environment);
        ResolvedConfig {
            config,
            field_sources,
            loaded_files: vec!["/etc/gatehouse/config.toml".into()],
        }
    }

    #[test]
    fn test_show_toml_annotates_and_hides_key() {
        let output = resolved().show(ShowFormat::Toml, None).unwrap();
        assert!(output.contains("Resolved Gatehouse Configuration"));
        assert!(output.contains("qr_window_secs = 30  # [defaults]"));
        assert!(output.contains("value hidden"));
        assert!(!output.contains("cdcd"));
    }

    #[test]
    fn test_show_json_section() {
        let output = resolved().show(ShowFormat::Json, Some("history")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["max_limit"], 500);
        assert!(json.get("qr_window_secs").is_none());
    }

    #[test]
    fn test_unknown_section() {
        assert!(resolved().show(ShowFormat::Toml, Some("nope")).is_err());
    }
}
