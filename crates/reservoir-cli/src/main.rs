//! Reservoir Loop CLI application
//!
//! Runs an open-loop injection schedule against an external reservoir
//! simulation engine and reports max pressure and production per step.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/reservoir-cli
//! ```
//!
//! # Usage
//!
//! - `reservoir-loop` runs with `reservoir_config.json` (defaults if absent)
//! - `reservoir-loop run --horizon 1 --dt 0.5 --output plot.json`
//! - `reservoir-loop config init` writes a starting configuration
//!
//! Set `RUST_LOG=debug` for per-call logging.

mod args;
mod commands;
mod console;
mod router;
mod signal_handler;

use args::Cli;
use clap::Parser;
use reservoir_core::config::load_from_file;
use reservoir_core::logging::init_tracing;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let console = router::console_for(&cli);

    // A broken config file is reported by the command itself
    let mut logging = load_from_file(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_default();
    if console.is_verbose() {
        logging.level = "debug".to_string();
    }
    if let Err(e) = init_tracing(&logging) {
        console.warn(&e.to_string());
    }

    match router::route(cli, &console).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            console.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
