//! Session manager and session handle

use crate::config::EngineConfig;
use crate::engine::{Engine, EngineError, EngineLauncher};
use crate::error::{SimError, SimResult};
use crate::types::{StepRequest, StepResult};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Marks the manager's single session slot as taken until dropped
#[derive(Debug)]
struct ActiveSlot(Arc<AtomicBool>);

impl Drop for ActiveSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Starts engine sessions, one at a time
pub struct SessionManager {
    launcher: Arc<dyn EngineLauncher>,
    start_timeout: Duration,
    call_timeout: Duration,
    active: Arc<AtomicBool>,
}

impl SessionManager {
    /// Create a manager using the deadlines from `config`
    pub fn new(launcher: Arc<dyn EngineLauncher>, config: &EngineConfig) -> Self {
        Self::with_timeouts(launcher, config.start_timeout(), config.call_timeout())
    }

    /// Create a manager with explicit deadlines
    pub fn with_timeouts(
        launcher: Arc<dyn EngineLauncher>,
        start_timeout: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            launcher,
            start_timeout,
            call_timeout,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a session from this manager is still open
    pub fn has_active_session(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Launch the engine and register `working_dir` for model lookup
    ///
    /// Launch, handshake and registration share the start deadline. If
    /// registration fails the half-started engine is closed before the
    /// error is returned.
    #[instrument(skip(self), fields(working_dir = %working_dir.display()))]
    pub async fn start(&self, working_dir: &Path) -> SimResult<SimulationSession> {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(SimError::session("An engine session is already active"));
        }
        let slot = ActiveSlot(Arc::clone(&self.active));

        info!("Starting engine");
        let started = Instant::now();

        let mut engine = match timeout(self.start_timeout, self.launcher.launch()).await {
            Ok(Ok(engine)) => engine,
            Ok(Err(e)) => return Err(start_error(e)),
            Err(_) => {
                return Err(SimError::engine_start(format!(
                    "Engine did not start within {}s",
                    self.start_timeout.as_secs_f64()
                )));
            }
        };

        let remaining = self.start_timeout.saturating_sub(started.elapsed());
        let registered = match timeout(remaining, engine.register_path(working_dir)).await {
            Ok(result) => result.map_err(start_error),
            Err(_) => Err(SimError::engine_start(format!(
                "Engine did not register '{}' within the start deadline",
                working_dir.display()
            ))),
        };

        if let Err(e) = registered {
            if let Err(close_err) = engine.close().await {
                debug!(error = %close_err, "closing half-started engine failed");
            }
            return Err(e);
        }

        let session = SimulationSession {
            id: Uuid::new_v4(),
            working_dir: working_dir.to_path_buf(),
            engine: Some(engine),
            call_timeout: self.call_timeout,
            calls: 0,
            started_at: Utc::now(),
            slot: Some(slot),
        };

        info!(
            session_id = %session.id,
            "Engine started in {:.2} seconds",
            started.elapsed().as_secs_f64()
        );
        Ok(session)
    }

    /// Run `work` against a fresh session and close it afterwards
    ///
    /// The session is closed whether `work` succeeds or fails; a close
    /// failure is logged and does not replace `work`'s output. If `work`
    /// panics the session's drop guard tears the engine down.
    pub async fn with_session<T, F>(&self, working_dir: &Path, work: F) -> SimResult<T>
    where
        F: for<'a> FnOnce(&'a mut SimulationSession) -> BoxFuture<'a, T>,
    {
        let mut session = self.start(working_dir).await?;
        let output = work(&mut session).await;
        if let Err(e) = session.close().await {
            warn!(session_id = %session.id(), error = %e, "engine session did not close cleanly");
        }
        Ok(output)
    }
}

fn start_error(error: EngineError) -> SimError {
    let code = error.error_code().to_string();
    SimError::engine_start(error.to_string()).with_context(code)
}

/// A live engine session
pub struct SimulationSession {
    id: Uuid,
    working_dir: PathBuf,
    engine: Option<Box<dyn Engine>>,
    call_timeout: Duration,
    calls: usize,
    started_at: DateTime<Utc>,
    slot: Option<ActiveSlot>,
}

impl SimulationSession {
    /// Session identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Directory registered with the engine
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// When the session was started
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of completed engine calls
    pub fn call_count(&self) -> usize {
        self.calls
    }

    /// Whether close has run
    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }

    /// One round trip into the engine
    ///
    /// The call is bounded by the session's call deadline and abandoned as
    /// soon as `cancel` fires. A reply without usable `pressure` and
    /// `prod_rate` fields is an engine call error.
    pub async fn invoke(
        &mut self,
        request: &StepRequest,
        cancel: &CancellationToken,
    ) -> SimResult<StepResult> {
        let call_timeout = self.call_timeout;
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| SimError::engine_call("Session is closed"))?;

        if cancel.is_cancelled() {
            return Err(SimError::Cancelled);
        }

        debug!(
            u = request.injection_rate,
            dt = request.dt,
            reset = request.reset,
            "invoking engine"
        );

        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SimError::Cancelled),
            outcome = timeout(call_timeout, engine.invoke(request)) => match outcome {
                Ok(reply) => reply?,
                Err(_) => {
                    return Err(SimError::Timeout {
                        millis: call_timeout.as_millis() as u64,
                        step: None,
                    });
                }
            },
        };

        self.calls += 1;
        StepResult::from_value(&reply).map_err(SimError::from)
    }

    /// Shut the engine down
    ///
    /// Only the first call reaches the engine; later calls are no-ops.
    pub async fn close(&mut self) -> SimResult<()> {
        let Some(mut engine) = self.engine.take() else {
            return Ok(());
        };

        let result = engine.close().await;
        self.slot.take();
        info!(session_id = %self.id, calls = self.calls, "Engine session closed");

        result.map_err(|e| {
            SimError::session(format!("Engine did not close cleanly: {}", e))
                .with_context(e.error_code().to_string())
        })
    }
}

impl Drop for SimulationSession {
    fn drop(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            warn!(session_id = %self.id, "engine session dropped without close, aborting engine");
            engine.abort();
        }
    }
}

impl std::fmt::Debug for SimulationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationSession")
            .field("id", &self.id)
            .field("working_dir", &self.working_dir)
            .field("calls", &self.calls)
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{RecordedCall, ScriptedLauncher};
    use serde_json::json;

    fn manager(launcher: ScriptedLauncher) -> SessionManager {
        SessionManager::with_timeouts(
            Arc::new(launcher),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_start_registers_working_dir() {
        let launcher = ScriptedLauncher::new();
        let log = launcher.log();
        let manager = manager(launcher);

        let mut session = manager.start(Path::new("/models")).await.unwrap();
        assert!(manager.has_active_session());
        assert_eq!(log.registered_paths(), vec![PathBuf::from("/models")]);

        session.close().await.unwrap();
        assert!(!manager.has_active_session());
    }

    #[tokio::test]
    async fn test_second_session_rejected_while_active() {
        let manager = manager(ScriptedLauncher::new());

        let mut first = manager.start(Path::new(".")).await.unwrap();
        let err = manager.start(Path::new(".")).await.unwrap_err();
        assert_eq!(err.error_code(), "SIM_SESSION");

        first.close().await.unwrap();
        let mut second = manager.start(Path::new(".")).await.unwrap();
        second.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_failure_is_engine_start_error() {
        let launcher = ScriptedLauncher::new().fail_start("license server unreachable");
        let log = launcher.log();
        let manager = manager(launcher);

        let err = manager.start(Path::new(".")).await.unwrap_err();
        assert_eq!(err.error_code(), "SIM_ENGINE_START");
        assert!(err.to_string().contains("license server unreachable"));
        assert_eq!(log.close_count(), 0);
        assert!(!manager.has_active_session());
    }

    #[tokio::test]
    async fn test_register_failure_closes_engine() {
        let launcher = ScriptedLauncher::new().fail_register();
        let log = launcher.log();
        let manager = manager(launcher);

        let err = manager.start(Path::new(".")).await.unwrap_err();
        assert_eq!(err.error_code(), "SIM_ENGINE_START");
        assert_eq!(log.close_count(), 1);
        assert!(!manager.has_active_session());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_deadline() {
        let launcher = ScriptedLauncher::new().launch_delay(Duration::from_secs(60));
        let manager = manager(launcher);

        let err = manager.start(Path::new(".")).await.unwrap_err();
        assert_eq!(err.error_code(), "SIM_ENGINE_START");
        assert!(err.to_string().contains("did not start"));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let launcher = ScriptedLauncher::new();
        let log = launcher.log();
        let manager = manager(launcher);

        let mut session = manager.start(Path::new(".")).await.unwrap();
        session.close().await.unwrap();
        session.close().await.unwrap();
        assert!(session.is_closed());
        assert_eq!(log.close_count(), 1);
    }

    #[tokio::test]
    async fn test_invoke_after_close_fails() {
        let manager = manager(ScriptedLauncher::new());
        let mut session = manager.start(Path::new(".")).await.unwrap();
        session.close().await.unwrap();

        let err = session
            .invoke(&StepRequest::step(1.0, 1.0), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "SIM_ENGINE_CALL");
    }

    #[tokio::test]
    async fn test_malformed_reply_is_call_error() {
        let launcher = ScriptedLauncher::new().respond_with(|_, _| Ok(json!({"pressure": [1.0]})));
        let manager = manager(launcher);
        let mut session = manager.start(Path::new(".")).await.unwrap();

        let err = session
            .invoke(&StepRequest::step(1.0, 1.0), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "SIM_ENGINE_CALL");
        assert!(err.to_string().contains("prod_rate"));
        session.close().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_invoke_deadline() {
        let launcher = ScriptedLauncher::new().latency(Duration::from_secs(30));
        let manager = manager(launcher);
        let mut session = manager.start(Path::new(".")).await.unwrap();

        let err = session
            .invoke(&StepRequest::step(1.0, 1.0), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SimError::Timeout { millis: 5000, .. }));
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_invoke_observes_cancellation() {
        let launcher = ScriptedLauncher::new();
        let log = launcher.log();
        let manager = manager(launcher);
        let mut session = manager.start(Path::new(".")).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = session
            .invoke(&StepRequest::step(1.0, 1.0), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SimError::Cancelled));
        assert_eq!(log.invokes().len(), 0);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_with_session_closes_after_work() {
        let launcher = ScriptedLauncher::new();
        let log = launcher.log();
        let manager = manager(launcher);

        let calls = manager
            .with_session(Path::new("."), |session| {
                Box::pin(async move {
                    let cancel = CancellationToken::new();
                    session
                        .invoke(&StepRequest::reset(0.1, 100.0, 100.0), &cancel)
                        .await
                        .map(|_| session.call_count())
                })
            })
            .await
            .unwrap();

        assert_eq!(calls.unwrap(), 1);
        assert_eq!(log.close_count(), 1);
        assert_eq!(log.calls().last(), Some(&RecordedCall::Close));
        assert!(!manager.has_active_session());
    }

    #[tokio::test]
    async fn test_drop_without_close_aborts_engine() {
        let launcher = ScriptedLauncher::new();
        let log = launcher.log();
        let manager = manager(launcher);

        let session = manager.start(Path::new(".")).await.unwrap();
        drop(session);

        assert_eq!(log.abort_count(), 1);
        assert!(!manager.has_active_session());
    }
}
