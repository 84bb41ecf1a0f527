//! Simulation run command

use crate::args::RunArgs;
use crate::console::CliConsole;
use crate::signal_handler::cancel_on_interrupt;
use anyhow::Result;
use colored::*;
use reservoir_core::config::load_from_file;
use reservoir_core::{ProcessLauncher, RunFailure, Simulation, SimError, TelemetrySeries};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Load the configuration, apply overrides and run against the engine process
pub async fn run(config_file: &Path, args: &RunArgs, console: &CliConsole) -> Result<()> {
    let mut config = load_from_file(config_file)?;
    args.apply(&mut config);
    let simulation = Simulation::new(config)?;

    let sim = &simulation.config().simulation;
    console.print_header("Reservoir Simulation");
    console.info(&format!(
        "Engine: {} ({})",
        simulation.config().engine.command.cyan(),
        simulation.config().engine.entry_point
    ));
    console.info(&format!(
        "Horizon: {} days, dt: {}, injection: {} m3/day",
        sim.horizon, sim.dt, sim.injection_rate
    ));

    let launcher = Arc::new(ProcessLauncher::new(simulation.config().engine.clone()));
    let cancel = CancellationToken::new();
    let interrupt = cancel_on_interrupt(cancel.clone());
    let outcome = simulation.run(launcher, cancel).await;
    interrupt.abort();

    match outcome {
        Ok(summary) => {
            export(console, &simulation, args.output.as_deref(), &summary.series, true)?;
            print_summary(console, &summary.series);
            console.success(&format!(
                "Completed {} steps in {:.2}s",
                summary.steps(),
                summary.wall_time.as_secs_f64()
            ));
            Ok(())
        }
        Err(failure) => Err(report_failure(console, &simulation, args.output.as_deref(), failure)),
    }
}

/// Show what a failed run completed and export it marked incomplete.
/// An export error is only warned about; the run's failure is returned.
fn report_failure(
    console: &CliConsole,
    simulation: &Simulation,
    output: Option<&Path>,
    failure: RunFailure,
) -> anyhow::Error {
    if matches!(failure.error, SimError::Cancelled) {
        console.warn(&format!(
            "Run cancelled after {} of {} steps",
            failure.partial.len(),
            failure.planned
        ));
    }
    if !failure.partial.is_empty() {
        console.warn("Partial results are incomplete");
        print_summary(console, &failure.partial);
        if let Err(e) = export(console, simulation, output, &failure.partial, false) {
            tracing::warn!(error = %e, "partial plot export failed");
            console.warn(&format!("Partial plot data not written: {}", e));
        }
    }
    failure.into()
}

fn export(
    console: &CliConsole,
    simulation: &Simulation,
    output: Option<&Path>,
    series: &TelemetrySeries,
    complete: bool,
) -> Result<()> {
    let Some(path) = output else {
        return Ok(());
    };
    simulation.plot_data(series, complete).write_json(path)?;
    console.info(&format!("Plot data written to {}", path.display()));
    Ok(())
}

fn print_summary(console: &CliConsole, series: &TelemetrySeries) {
    if let Some(peak) = series.peak_pressure() {
        console.print_field("Peak pressure", &format!("{:.2} Bar", peak));
    }
    if let Some(last) = series.last() {
        console.print_field(
            "Final production rate",
            &format!("{:.2} m3/day at t = {:.2}", last.production_rate, last.elapsed_time),
        );
    }
}
