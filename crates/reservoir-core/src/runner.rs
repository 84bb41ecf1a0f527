//! One complete simulation run
//!
//! [`Simulation`] ties the pieces together: start a session in the working
//! directory, run a fresh [`StepController`] against it, and close the
//! session on every exit path.

use crate::config::{Config, ConfigValidator};
use crate::controller::{RunFailure, StepController};
use crate::engine::EngineLauncher;
use crate::error::{SimError, SimResult};
use crate::session::SessionManager;
use crate::telemetry::{PlotData, TelemetrySeries};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// One record per completed step
    pub series: TelemetrySeries,
    /// Session the run used
    pub session_id: Uuid,
    /// When the session was started
    pub started_at: DateTime<Utc>,
    /// Wall-clock time including engine start and close
    pub wall_time: Duration,
}

impl RunSummary {
    /// Number of completed steps
    pub fn steps(&self) -> usize {
        self.series.len()
    }
}

/// A configured simulation, ready to run
#[derive(Debug, Clone)]
pub struct Simulation {
    config: Config,
}

impl Simulation {
    /// Validate `config` for a run
    pub fn new(config: Config) -> SimResult<Self> {
        ConfigValidator::validate(&config)?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory registered with the engine
    pub fn working_dir(&self) -> SimResult<PathBuf> {
        match &self.config.engine.working_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir()
                .map_err(|e| SimError::io(format!("Cannot resolve working directory: {}", e))),
        }
    }

    /// Run the configured simulation on an engine from `launcher`
    ///
    /// The session is closed whether the run completes, fails or is
    /// cancelled. A start failure leaves an empty partial series.
    pub async fn run(
        &self,
        launcher: Arc<dyn EngineLauncher>,
        cancel: CancellationToken,
    ) -> Result<RunSummary, RunFailure> {
        let started = Instant::now();
        let mut controller = StepController::new(self.config.simulation.clone())
            .map_err(|e| RunFailure::empty(e, 0))?;
        let planned = controller.plan().len();

        let working_dir = self
            .working_dir()
            .map_err(|e| RunFailure::empty(e, planned))?;
        let manager = SessionManager::new(launcher, &self.config.engine);

        let outcome = manager
            .with_session(&working_dir, move |session| {
                Box::pin(async move {
                    let series = controller.run(session, &cancel).await?;
                    Ok::<_, RunFailure>((series, session.id(), session.started_at()))
                })
            })
            .await
            .map_err(|e| RunFailure::empty(e, planned))?;

        let (series, session_id, started_at) = outcome?;
        let summary = RunSummary {
            series,
            session_id,
            started_at,
            wall_time: started.elapsed(),
        };
        info!(
            session_id = %summary.session_id,
            steps = summary.steps(),
            wall_time_secs = summary.wall_time.as_secs_f64(),
            "simulation finished"
        );
        Ok(summary)
    }

    /// Plot data for a finished or partial series
    pub fn plot_data(&self, series: &TelemetrySeries, complete: bool) -> PlotData {
        PlotData::from_series(
            series,
            self.config.simulation.initial_pressure,
            self.config.simulation.injection_rate,
            complete,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::engine::ScriptedLauncher;

    fn config(horizon: f64, dt: f64) -> Config {
        let mut config = Config::default();
        config.simulation = SimulationConfig::default().with_horizon(horizon, dt);
        config.engine.working_dir = Some(std::env::temp_dir());
        config
    }

    #[tokio::test]
    async fn test_run_summary() {
        let launcher = ScriptedLauncher::new();
        let log = launcher.log();
        let simulation = Simulation::new(config(1.0, 0.5)).unwrap();

        let summary = simulation
            .run(Arc::new(launcher), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(summary.steps(), 2);
        assert_eq!(log.registered_paths(), vec![std::env::temp_dir()]);
        assert_eq!(log.close_count(), 1);

        let plot = simulation.plot_data(&summary.series, true);
        assert_eq!(plot.pressure.x, vec![0.5, 1.0]);
    }

    #[tokio::test]
    async fn test_start_failure_has_empty_partial() {
        let launcher = ScriptedLauncher::new().fail_start("engine binary missing");
        let simulation = Simulation::new(config(1.0, 0.5)).unwrap();

        let failure = simulation
            .run(Arc::new(launcher), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(failure.error.error_code(), "SIM_ENGINE_START");
        assert!(failure.partial.is_empty());
        assert_eq!(failure.planned, 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config(1.0, 0.5);
        bad.engine.command = String::new();
        assert!(Simulation::new(bad).is_err());
    }
}
