//! Reservoir Loop Core Library
//!
//! This crate drives an external reservoir simulation engine through a fixed
//! horizon of open-loop steps: session management, the step controller,
//! telemetry normalization, progress reporting, configuration and plot export.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod logging;
pub mod progress;
pub mod runner;
pub mod schedule;
pub mod session;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{Config, EngineConfig, LoggingConfig, RemainderPolicy, SimulationConfig};
pub use controller::{ControllerState, RunFailure, StepController};
pub use engine::{Engine, EngineError, EngineLauncher, ProcessLauncher, ScriptedLauncher};
pub use error::{SimError, SimResult};
pub use progress::ResultLogger;
pub use runner::{RunSummary, Simulation};
pub use schedule::{PlannedStep, StepPlan};
pub use session::{SessionManager, SimulationSession};
pub use telemetry::{PlotData, TelemetryCollector, TelemetryRecord, TelemetrySeries};
pub use types::{StepRequest, StepResult};
