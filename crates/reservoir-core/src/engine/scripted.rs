//! In-process scripted engine
//!
//! Stands in for the external engine in tests and dry runs. Replies come from
//! a responder closure and every call is recorded in a shared [`CallLog`]
//! that outlives the engine, so tests can inspect what a session did after it
//! has been closed or dropped.

use super::error::EngineError;
use super::{Engine, EngineLauncher};
use crate::telemetry::PRESSURE_SCALE;
use crate::types::{PRESSURE_FIELD, PROD_RATE_FIELD, StepRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Builds a reply from the request and the number of stepping calls so far
/// (0 for the reset call)
pub type Responder = Arc<dyn Fn(&StepRequest, usize) -> Result<Value, EngineError> + Send + Sync>;

/// One call observed by a scripted engine
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    /// Engine launched
    Launch,
    /// Path registration
    RegisterPath(PathBuf),
    /// Entry point invocation
    Invoke(StepRequest),
    /// Graceful close
    Close,
    /// Teardown without close
    Abort,
}

/// Shared, append-only record of engine calls
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl CallLog {
    fn record(&self, call: RecordedCall) {
        self.calls.lock().push(call);
    }

    /// Every call in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Every invoke request in order
    pub fn invokes(&self) -> Vec<StepRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                RecordedCall::Invoke(req) => Some(*req),
                _ => None,
            })
            .collect()
    }

    /// Number of reset calls
    pub fn reset_count(&self) -> usize {
        self.invokes().iter().filter(|r| r.reset).count()
    }

    /// Number of stepping calls
    pub fn step_count(&self) -> usize {
        self.invokes().iter().filter(|r| !r.reset).count()
    }

    /// Registered paths in order
    pub fn registered_paths(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                RecordedCall::RegisterPath(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of launches
    pub fn launch_count(&self) -> usize {
        self.count(|c| matches!(c, RecordedCall::Launch))
    }

    /// Number of graceful closes
    pub fn close_count(&self) -> usize {
        self.count(|c| matches!(c, RecordedCall::Close))
    }

    /// Number of aborts
    pub fn abort_count(&self) -> usize {
        self.count(|c| matches!(c, RecordedCall::Abort))
    }

    fn count(&self, pred: impl Fn(&RecordedCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }
}

/// Default responder: pressure rises by one bar per step from the initial
/// pressure given at reset, production mirrors the injection with a
/// negative sign
fn ramp_responder() -> Responder {
    let initial = Arc::new(Mutex::new(0.0_f64));
    Arc::new(move |request: &StepRequest, steps: usize| {
        let mut p0 = initial.lock();
        if request.reset {
            *p0 = request.initial_pressure;
        }
        let peak = (*p0 + steps as f64) * PRESSURE_SCALE;
        Ok(json!({
            PRESSURE_FIELD: [*p0 * PRESSURE_SCALE, peak, (peak + *p0 * PRESSURE_SCALE) / 2.0],
            PROD_RATE_FIELD: -request.injection_rate,
        }))
    })
}

/// In-process engine driven by a [`Responder`]
pub struct ScriptedEngine {
    log: CallLog,
    responder: Responder,
    latency: Option<Duration>,
    fail_on_step: Option<usize>,
    fail_register: bool,
    steps: usize,
    closed: bool,
}

impl ScriptedEngine {
    /// Engine with the default ramp responder
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            responder: ramp_responder(),
            latency: None,
            fail_on_step: None,
            fail_register: false,
            steps: 0,
            closed: false,
        }
    }
}

#[async_trait]
impl Engine for ScriptedEngine {
    async fn register_path(&mut self, path: &Path) -> Result<(), EngineError> {
        self.log.record(RecordedCall::RegisterPath(path.to_path_buf()));
        if self.fail_register {
            return Err(EngineError::call(format!(
                "cannot add '{}' to the search path",
                path.display()
            )));
        }
        Ok(())
    }

    async fn invoke(&mut self, request: &StepRequest) -> Result<Value, EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }
        self.log.record(RecordedCall::Invoke(*request));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if !request.reset {
            self.steps += 1;
            if self.fail_on_step == Some(self.steps) {
                return Err(EngineError::call(format!(
                    "injected failure at step {}",
                    self.steps
                )));
            }
        }

        (self.responder)(request, self.steps)
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        self.log.record(RecordedCall::Close);
        self.closed = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.closed
    }

    fn abort(&mut self) {
        self.log.record(RecordedCall::Abort);
        self.closed = true;
    }
}

/// Launcher producing [`ScriptedEngine`]s that share one [`CallLog`]
#[derive(Clone)]
pub struct ScriptedLauncher {
    log: CallLog,
    responder: Option<Responder>,
    latency: Option<Duration>,
    launch_delay: Option<Duration>,
    fail_on_step: Option<usize>,
    fail_start: Option<String>,
    fail_register: bool,
}

impl Default for ScriptedLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLauncher {
    /// Launcher with the default ramp responder and no faults
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            responder: None,
            latency: None,
            launch_delay: None,
            fail_on_step: None,
            fail_start: None,
            fail_register: false,
        }
    }

    /// Shared call log
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Replace the responder
    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: Fn(&StepRequest, usize) -> Result<Value, EngineError> + Send + Sync + 'static,
    {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Delay every invoke
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay the launch itself
    pub fn launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = Some(delay);
        self
    }

    /// Fail the `step`-th stepping call (1-based)
    pub fn fail_on_step(mut self, step: usize) -> Self {
        self.fail_on_step = Some(step);
        self
    }

    /// Fail every launch with `message`
    pub fn fail_start(mut self, message: impl Into<String>) -> Self {
        self.fail_start = Some(message.into());
        self
    }

    /// Fail path registration
    pub fn fail_register(mut self) -> Self {
        self.fail_register = true;
        self
    }
}

#[async_trait]
impl EngineLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn Engine>, EngineError> {
        if let Some(delay) = self.launch_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.fail_start {
            return Err(EngineError::start(message.clone()));
        }
        self.log.record(RecordedCall::Launch);

        let mut engine = ScriptedEngine::new(self.log.clone());
        if let Some(responder) = &self.responder {
            engine.responder = Arc::clone(responder);
        }
        engine.latency = self.latency;
        engine.fail_on_step = self.fail_on_step;
        engine.fail_register = self.fail_register;
        Ok(Box::new(engine))
    }
}
