//! File-based configuration loading

use crate::config::model::Config;
use crate::error::{SimError, SimResult};
use std::fs;
use std::path::Path;

/// Load configuration from a file
///
/// Supports JSON, TOML, and YAML formats based on file extension.
/// Returns default config if file doesn't exist.
pub fn load_from_file(path: &Path) -> SimResult<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        SimError::config_with_context(
            format!("Failed to read config file: {}", e),
            format!("Reading configuration from '{}'", path.display()),
        )
    })?;

    parse_config(&content, path)
}

/// Parse configuration text, choosing the format from `path`'s extension
pub fn parse_config(content: &str, path: &Path) -> SimResult<Config> {
    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => toml::from_str(content).map_err(|e| {
            SimError::config_with_context(
                format!("Failed to parse TOML config: {}", e),
                format!("Deserializing TOML configuration from '{}'", path.display()),
            )
        })?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(content).map_err(|e| {
            SimError::config_with_context(
                format!("Failed to parse YAML config: {}", e),
                format!("Deserializing YAML configuration from '{}'", path.display()),
            )
        })?,
        _ => serde_json::from_str(content).map_err(|e| {
            SimError::config_with_context(
                format!("Failed to parse JSON config: {}", e),
                format!("Deserializing JSON configuration from '{}'", path.display()),
            )
        })?,
    };

    Ok(config)
}

/// Write `config` as pretty-printed JSON
pub fn save_to_file(config: &Config, path: &Path) -> SimResult<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| SimError::config(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, json).map_err(|e| {
        SimError::io_with_path(format!("Failed to write config file: {}", e), path)
    })
}
