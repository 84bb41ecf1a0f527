//! End-to-end tests for simulation runs
//!
//! Drive complete runs through `Simulation` against the scripted engine and,
//! on unix, against a real child process.

use reservoir_core::engine::{EngineError, RecordedCall, ScriptedLauncher};
use reservoir_core::{Config, SimError, Simulation, SimulationConfig};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn config(horizon: f64, dt: f64, injection_rate: f64) -> Config {
    let mut config = Config::default();
    config.simulation = SimulationConfig::default()
        .with_horizon(horizon, dt)
        .with_injection_rate(injection_rate);
    config.engine.working_dir = Some(PathBuf::from("."));
    config
}

#[tokio::test]
async fn test_reference_run_records_every_step() {
    let launcher = ScriptedLauncher::new();
    let simulation = Simulation::new(Config::default()).unwrap();
    let dt = simulation.config().simulation.dt;

    let summary = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap();

    let times = summary.series.times();
    assert_eq!(times.len(), 100);
    for (i, t) in times.iter().enumerate() {
        assert_eq!(*t, (i + 1) as f64 * dt);
    }
    assert!(times.windows(2).all(|w| w[1] > w[0]));
}

#[tokio::test]
async fn test_two_step_horizon() {
    let launcher = ScriptedLauncher::new();
    let log = launcher.log();
    let simulation = Simulation::new(config(1.0, 0.5, 150.0)).unwrap();

    let summary = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.steps(), 2);
    assert_eq!(summary.series.times(), vec![0.5, 1.0]);
    assert_eq!(log.reset_count(), 1);
    assert_eq!(log.step_count(), 2);
    assert!(log.invokes()[1..].iter().all(|r| r.injection_rate == 150.0 && r.dt == 0.5));
}

#[tokio::test]
async fn test_inexact_horizon_runs_floor_of_ratio_steps() {
    let launcher = ScriptedLauncher::new();
    let log = launcher.log();
    let simulation = Simulation::new(config(0.7, 0.1, 150.0)).unwrap();

    let summary = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.steps(), 6);
    assert_eq!(log.step_count(), 6);
    assert_eq!(summary.series.last().unwrap().elapsed_time, 6.0 * 0.1);
}

#[tokio::test]
async fn test_horizon_shorter_than_dt_is_an_empty_run() {
    let launcher = ScriptedLauncher::new();
    let log = launcher.log();
    let simulation = Simulation::new(config(0.05, 0.1, 150.0)).unwrap();

    let summary = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap();

    assert!(summary.series.is_empty());
    assert_eq!(log.reset_count(), 1);
    assert_eq!(log.step_count(), 0);
    assert_eq!(log.close_count(), 1);
}

#[tokio::test]
async fn test_reset_precedes_steps_and_close_is_last() {
    let launcher = ScriptedLauncher::new();
    let log = launcher.log();
    let simulation = Simulation::new(config(1.0, 0.25, 150.0)).unwrap();

    simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap();

    let calls = log.calls();
    assert_eq!(calls[0], RecordedCall::Launch);
    assert!(matches!(calls[1], RecordedCall::RegisterPath(_)));

    let invokes = log.invokes();
    assert!(invokes[0].reset);
    assert_eq!(invokes[0].dt, 0.25);
    assert_eq!(invokes[0].initial_pressure, 100.0);
    assert!(invokes[1..].iter().all(|r| !r.reset));

    assert_eq!(log.close_count(), 1);
    assert_eq!(calls.last(), Some(&RecordedCall::Close));
}

#[tokio::test]
async fn test_results_are_normalized() {
    let launcher = ScriptedLauncher::new()
        .respond_with(|_, _| Ok(json!({"pressure": [[1.0e7, 2.0e7], [1.5e7, 0.5e7]], "prod_rate": -123.4})));
    let simulation = Simulation::new(config(1.0, 0.5, 150.0)).unwrap();

    let summary = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.series.max_pressures(), vec![200.0, 200.0]);
    assert_eq!(summary.series.production_rates(), vec![123.4, 123.4]);
}

#[tokio::test]
async fn test_mid_run_failure_keeps_prefix_and_closes_once() {
    let launcher = ScriptedLauncher::new().fail_on_step(4);
    let log = launcher.log();
    let simulation = Simulation::new(config(1.0, 0.1, 150.0)).unwrap();

    let failure = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(failure.error.error_code(), "SIM_ENGINE_CALL");
    assert_eq!(failure.error.step(), Some(4));
    assert_eq!(failure.partial.len(), 3);
    assert_eq!(failure.planned, 10);
    assert_eq!(failure.partial.last().unwrap().step, 3);
    assert_eq!(log.step_count(), 4);
    assert_eq!(log.close_count(), 1);
    assert_eq!(log.calls().last(), Some(&RecordedCall::Close));
}

#[tokio::test]
async fn test_malformed_reply_terminates_run() {
    let launcher = ScriptedLauncher::new().respond_with(|request, steps| {
        if !request.reset && steps == 2 {
            Ok(json!({"pressure": [], "prod_rate": 1.0}))
        } else {
            Ok(json!({"pressure": [1.0e7], "prod_rate": 1.0}))
        }
    });
    let log = launcher.log();
    let simulation = Simulation::new(config(1.0, 0.25, 150.0)).unwrap();

    let failure = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(failure.error.error_code(), "SIM_ENGINE_CALL");
    assert_eq!(failure.error.step(), Some(2));
    assert_eq!(failure.partial.len(), 1);
    assert_eq!(log.close_count(), 1);
}

#[tokio::test]
async fn test_engine_error_reply_terminates_run() {
    let launcher = ScriptedLauncher::new().respond_with(|request, steps| {
        if !request.reset && steps == 1 {
            Err(EngineError::remote(-32000, "solver diverged"))
        } else {
            Ok(json!({"pressure": [1.0e7], "prod_rate": 1.0}))
        }
    });
    let simulation = Simulation::new(config(1.0, 0.5, 150.0)).unwrap();

    let failure = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(failure.error.to_string().contains("solver diverged"));
    assert!(failure.partial.is_empty());
}

#[tokio::test]
async fn test_cancellation_between_steps() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let launcher = ScriptedLauncher::new().respond_with(move |request, steps| {
        if steps == 2 {
            trigger.cancel();
        }
        Ok(json!({"pressure": [request.initial_pressure * 1e5 + 1.0], "prod_rate": 0.0}))
    });
    let log = launcher.log();
    let simulation = Simulation::new(config(1.0, 0.1, 150.0)).unwrap();

    let failure = simulation.run(Arc::new(launcher), cancel).await.unwrap_err();

    assert!(matches!(failure.error, SimError::Cancelled));
    assert_eq!(failure.partial.len(), 2);
    assert_eq!(log.step_count(), 2);
    assert_eq!(log.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_call_deadline_yields_timeout() {
    let launcher = ScriptedLauncher::new().latency(Duration::from_secs(30));
    let log = launcher.log();
    let mut config = config(1.0, 0.5, 150.0);
    config.engine.call_timeout_secs = 2;
    let simulation = Simulation::new(config).unwrap();

    let failure = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        failure.error,
        SimError::Timeout {
            millis: 2000,
            step: Some(0)
        }
    ));
    assert!(failure.partial.is_empty());
    assert_eq!(log.close_count(), 1);
}

#[tokio::test]
async fn test_start_failure_never_closes() {
    let launcher = ScriptedLauncher::new().fail_start("no license available");
    let log = launcher.log();
    let simulation = Simulation::new(config(1.0, 0.5, 150.0)).unwrap();

    let failure = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(failure.error.error_code(), "SIM_ENGINE_START");
    assert_eq!(log.close_count(), 0);
    assert!(log.invokes().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_against_child_process() {
    let script = r#"i=0
while IFS= read -r line; do
  case "$line" in
    *'"method":"session/shutdown"'*) exit 0 ;;
  esac
  i=$((i+1))
  case "$line" in
    *'"method":"session/invoke"'*)
      printf '{"jsonrpc":"2.0","id":%d,"result":{"pressure":[1.0e7,2.0e7,1.5e7],"prod_rate":-123.4}}\n' "$i" ;;
    *)
      printf '{"jsonrpc":"2.0","id":%d,"result":{}}\n' "$i" ;;
  esac
done"#;
    let mut config = config(1.0, 0.5, 150.0);
    config.engine.command = "sh".to_string();
    config.engine.args = vec!["-c".to_string(), script.to_string()];

    let simulation = Simulation::new(config.clone()).unwrap();
    let launcher = reservoir_core::ProcessLauncher::new(config.engine);

    let summary = simulation
        .run(Arc::new(launcher), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.series.times(), vec![0.5, 1.0]);
    assert_eq!(summary.series.max_pressures(), vec![200.0, 200.0]);
    assert_eq!(summary.series.production_rates(), vec![123.4, 123.4]);
}
