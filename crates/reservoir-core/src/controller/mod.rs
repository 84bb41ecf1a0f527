//! Open-loop step controller
//!
//! Drives one session through `Uninitialized -> Initialized -> Stepping ->
//! Terminated`: a single reset call, then one stepping call per planned step
//! with the injection setpoint held fixed. The first failed call terminates
//! the run; whatever was recorded up to that point is handed back with the
//! error.

use crate::config::{ConfigValidator, SimulationConfig};
use crate::error::{SimError, SimResult};
use crate::progress::ResultLogger;
use crate::schedule::{PlannedStep, StepPlan};
use crate::session::SimulationSession;
use crate::telemetry::{TelemetryCollector, TelemetrySeries};
use crate::types::StepRequest;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

/// Where a controller is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Reset not yet sent
    Uninitialized,
    /// Reset acknowledged, no steps yet
    Initialized,
    /// `completed` steps done
    Stepping { completed: usize },
    /// Run over, successfully or not
    Terminated { completed: usize },
}

/// A run that stopped before its last planned step
#[derive(Debug, Error)]
#[error("{error} ({completed} of {planned} steps completed)", completed = .partial.len())]
pub struct RunFailure {
    /// What stopped the run
    #[source]
    pub error: SimError,
    /// Records of the steps completed before the failure
    pub partial: TelemetrySeries,
    /// Number of steps the run was planned for
    pub planned: usize,
}

impl RunFailure {
    /// Failure before any step completed
    pub fn empty(error: SimError, planned: usize) -> Self {
        Self {
            error,
            partial: TelemetrySeries::new(),
            planned,
        }
    }
}

/// Runs the reset-then-step loop against a session
#[derive(Debug)]
pub struct StepController {
    config: SimulationConfig,
    plan: StepPlan,
    state: ControllerState,
}

impl StepController {
    /// Validate `config` and plan its steps
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        ConfigValidator::validate_simulation(&config)?;
        let plan = StepPlan::from_config(&config)?;
        Ok(Self {
            config,
            plan,
            state: ControllerState::Uninitialized,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Planned steps
    pub fn plan(&self) -> &StepPlan {
        &self.plan
    }

    /// Simulation parameters
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The initializing call
    pub fn reset_request(&self) -> StepRequest {
        StepRequest::reset(
            self.config.dt,
            self.config.initial_pressure,
            self.config.permeability,
        )
    }

    /// The stepping call for `step`
    pub fn step_request(&self, step: &PlannedStep) -> StepRequest {
        StepRequest::step(self.config.injection_rate, step.dt)
    }

    /// Reset the engine and run every planned step
    ///
    /// Cancellation is checked before each call and raced against each call
    /// in flight. The session is left open; closing it is the caller's job.
    #[instrument(skip_all, fields(session_id = %session.id(), steps = self.plan.len()))]
    pub async fn run(
        &mut self,
        session: &mut SimulationSession,
        cancel: &CancellationToken,
    ) -> Result<TelemetrySeries, RunFailure> {
        let planned = self.plan.len();
        if self.state != ControllerState::Uninitialized {
            return Err(RunFailure::empty(
                SimError::session("Controller has already run"),
                planned,
            ));
        }

        let mut collector = TelemetryCollector::with_capacity(planned);
        let logger = ResultLogger::new(self.config.log_interval, planned);

        let reset = self.reset_request();
        if let Err(e) = session.invoke(&reset, cancel).await {
            return Err(self.terminate(e.at_step(0), collector));
        }
        self.state = ControllerState::Initialized;
        debug!(
            initial_pressure = reset.initial_pressure,
            permeability = reset.initial_permeability,
            "engine reset"
        );

        for step in self.plan.clone().steps() {
            if cancel.is_cancelled() {
                return Err(self.terminate(SimError::Cancelled, collector));
            }

            let request = self.step_request(&step);
            let result = match session.invoke(&request, cancel).await {
                Ok(result) => result,
                Err(e) => return Err(self.terminate(e.at_step(step.index), collector)),
            };

            let record = match collector.ingest(&step, &result) {
                Ok(record) => record,
                Err(e) => return Err(self.terminate(e.at_step(step.index), collector)),
            };
            self.state = ControllerState::Stepping {
                completed: step.index,
            };
            logger.observe(&record);
        }

        self.state = ControllerState::Terminated {
            completed: collector.len(),
        };
        info!(steps = collector.len(), "run complete");
        Ok(collector.into_series())
    }

    fn terminate(&mut self, error: SimError, collector: TelemetryCollector) -> RunFailure {
        let partial = collector.into_series();
        self.state = ControllerState::Terminated {
            completed: partial.len(),
        };
        match &error {
            SimError::Cancelled => info!(completed = partial.len(), "run cancelled"),
            e => error!(
                error = %e,
                code = e.error_code(),
                step = ?e.step(),
                completed = partial.len(),
                "run failed"
            ),
        }
        RunFailure {
            error,
            partial,
            planned: self.plan.len(),
        }
    }
}
