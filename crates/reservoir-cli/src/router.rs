//! Command routing logic for CLI

use crate::args::{Cli, Commands, ConfigAction, RunArgs};
use crate::commands;
use crate::console::CliConsole;
use anyhow::Result;

/// Console honoring the global `--verbose` flag
pub fn console_for(cli: &Cli) -> CliConsole {
    CliConsole::new(cli.verbose)
}

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli, console: &CliConsole) -> Result<()> {
    match cli.command {
        Some(Commands::Run(args)) => commands::run::run(&cli.config, &args, console).await,
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&cli.config, console).await,
            ConfigAction::Init { force } => {
                commands::config::init(&cli.config, force, console).await
            }
        },
        None => commands::run::run(&cli.config, &RunArgs::default(), console).await,
    }
}
