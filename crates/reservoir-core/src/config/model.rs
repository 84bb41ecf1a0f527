//! Configuration data structures

use super::defaults;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
///
/// All fields support serde(default) so partial configuration files are
/// merged with defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Control loop parameters
    pub simulation: SimulationConfig,
    /// Engine launch parameters
    pub engine: EngineConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }
}

/// What to do when the horizon is not a whole number of steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Drop the remainder and run `floor(horizon / dt)` steps
    #[default]
    Truncate,
    /// Treat an inexact horizon as a configuration error
    Reject,
    /// Run one extra, shorter step covering the remainder
    ShortFinalStep,
}

/// Parameters of one control run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Total simulated time
    pub horizon: f64,
    /// Step length; also passed, without advancing time, to the reset call
    pub dt: f64,
    /// Initial pressure handed to the reset call, in bar
    pub initial_pressure: f64,
    /// Initial permeability handed to the reset call
    pub permeability: f64,
    /// Injection setpoint held for every step
    pub injection_rate: f64,
    /// Handling of a horizon that is not a multiple of `dt`
    pub remainder: RemainderPolicy,
    /// Completed steps between progress lines
    pub log_interval: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon: defaults::simulation::HORIZON,
            dt: defaults::simulation::DT,
            initial_pressure: defaults::simulation::INITIAL_PRESSURE,
            permeability: defaults::simulation::PERMEABILITY,
            injection_rate: defaults::simulation::INJECTION_RATE,
            remainder: RemainderPolicy::default(),
            log_interval: defaults::simulation::LOG_INTERVAL,
        }
    }
}

impl SimulationConfig {
    /// Set the horizon and step length
    pub fn with_horizon(mut self, horizon: f64, dt: f64) -> Self {
        self.horizon = horizon;
        self.dt = dt;
        self
    }

    /// Set the injection setpoint
    pub fn with_injection_rate(mut self, rate: f64) -> Self {
        self.injection_rate = rate;
        self
    }

    /// Set the reset-call initial conditions
    pub fn with_initial_state(mut self, pressure: f64, permeability: f64) -> Self {
        self.initial_pressure = pressure;
        self.permeability = permeability;
        self
    }

    /// Set the remainder policy
    pub fn with_remainder(mut self, policy: RemainderPolicy) -> Self {
        self.remainder = policy;
        self
    }
}

/// How to launch and talk to the engine process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Executable to spawn
    pub command: String,
    /// Command arguments
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: HashMap<String, String>,
    /// Directory registered with the engine for model lookup (None = current directory)
    pub working_dir: Option<PathBuf>,
    /// Model function invoked on every call
    pub entry_point: String,
    /// Outputs requested from the entry point
    pub result_arity: u32,
    /// Deadline for launch, handshake and path registration
    pub start_timeout_secs: u64,
    /// Deadline for a single invoke
    pub call_timeout_secs: u64,
    /// Grace period before a closing engine is killed
    pub close_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: defaults::engine::COMMAND.to_string(),
            args: Vec::new(),
            env: HashMap::new(),
            working_dir: None,
            entry_point: defaults::engine::ENTRY_POINT.to_string(),
            result_arity: defaults::engine::RESULT_ARITY,
            start_timeout_secs: defaults::engine::START_TIMEOUT_SECS,
            call_timeout_secs: defaults::engine::CALL_TIMEOUT_SECS,
            close_timeout_secs: defaults::engine::CLOSE_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    /// Start deadline as Duration
    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    /// Per-call deadline as Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Close grace period as Duration
    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
