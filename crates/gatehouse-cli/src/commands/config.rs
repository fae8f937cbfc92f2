//! Config command - inspect the resolved configuration.

use gatehouse_config::{ResolvedConfig, SYSTEM_CONFIG_PATH, ShowFormat};

use crate::config_bridge::storage_path;
use crate::theme::Theme;

/// Print the resolved configuration with source annotations.
pub(crate) fn show(
    resolved: &ResolvedConfig,
    json: bool,
    section: Option<&str>,
) -> anyhow::Result<()> {
    let format = if json { ShowFormat::Json } else { ShowFormat::Toml };
    let output = resolved
        .show(format, section)
        .map_err(|_| anyhow::anyhow!("unknown config section: {}", section.unwrap_or("")))?;
    print!("{output}");
    Ok(())
}

/// Print the files consulted during loading and the store location.
pub(crate) fn paths(resolved: &ResolvedConfig) -> anyhow::Result<()> {
    println!("\n{}", Theme::header("Config Files"));
    println!("{}", Theme::kv("System", SYSTEM_CONFIG_PATH));
    println!("{}", Theme::kv("User", "~/.gatehouse/config.toml"));
    for path in &resolved.loaded_files {
        println!("{}", Theme::kv("Loaded", path));
    }
    println!("{}", Theme::kv("Store", &storage_path(&resolved.config)?.display().to_string()));
    println!();
    Ok(())
}
