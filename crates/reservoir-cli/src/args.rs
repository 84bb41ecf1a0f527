//! CLI argument definitions using clap
//!
//! - reservoir-loop                 # Run with reservoir_config.json
//! - reservoir-loop run --dt 0.5    # Run with overrides
//! - reservoir-loop config show     # Print the effective configuration
//! - reservoir-loop config init     # Write the default configuration

use clap::{Args, Parser, Subcommand};
use reservoir_core::Config;
use std::path::PathBuf;

/// Default configuration file name used across all CLI commands.
pub const DEFAULT_CONFIG_FILE: &str = "reservoir_config.json";

#[derive(Parser, Debug)]
#[command(name = "reservoir-loop")]
#[command(about = "Drive a reservoir simulation engine through a fixed-horizon injection run")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (JSON, TOML or YAML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug logging and detailed console output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the simulation (default)
    Run(RunArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides applied on top of the configuration file
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct RunArgs {
    /// Directory registered with the engine for model lookup
    #[arg(long)]
    pub working_dir: Option<PathBuf>,

    /// Total simulated time
    #[arg(long)]
    pub horizon: Option<f64>,

    /// Step length
    #[arg(long)]
    pub dt: Option<f64>,

    /// Injection setpoint held for every step
    #[arg(long)]
    pub injection_rate: Option<f64>,

    /// Write plot data as JSON to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl RunArgs {
    /// Apply the overrides to `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.working_dir {
            config.engine.working_dir = Some(dir.clone());
        }
        if let Some(horizon) = self.horizon {
            config.simulation.horizon = horizon;
        }
        if let Some(dt) = self.dt {
            config.simulation.dt = dt;
        }
        if let Some(rate) = self.injection_rate {
            config.simulation.injection_rate = rate;
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,

    /// Create a configuration file with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
