//! Configuration management commands

use crate::console::CliConsole;
use anyhow::{Context, Result, bail};
use reservoir_core::config::{ConfigValidator, file_loader::save_to_file, load_from_file};
use reservoir_core::Config;
use std::path::Path;

/// Print the effective configuration as JSON
pub async fn show(config_file: &Path, console: &CliConsole) -> Result<()> {
    if config_file.exists() {
        console.info(&format!("Loaded configuration from: {}", config_file.display()));
    } else {
        console.warn(&format!(
            "Configuration file not found: {}",
            config_file.display()
        ));
        console.info("Using default configuration");
    }

    let config = load_from_file(config_file)?;
    if let Err(e) = ConfigValidator::validate(&config) {
        console.warn(&format!("Configuration is invalid: {}", e));
    }

    let json = serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?;
    println!("{}", json);
    Ok(())
}

/// Write the default configuration to `config_file`
pub async fn init(config_file: &Path, force: bool, console: &CliConsole) -> Result<()> {
    if config_file.exists() && !force {
        console.warn("Use --force to overwrite");
        bail!(
            "Configuration file already exists: {}",
            config_file.display()
        );
    }

    save_to_file(&Config::default(), config_file)?;
    console.success(&format!(
        "Created configuration file: {}",
        config_file.display()
    ));
    console.info("Edit engine.command and engine.working_dir to point at your engine and model");
    Ok(())
}
