//! Configuration for reservoir-loop
//!
//! [`Config`] replaces the fixed constants of a single run: the control
//! horizon and step, the initial conditions handed to the reset call, the
//! injection setpoint, how the engine is launched, and logging.

pub mod defaults;
pub mod file_loader;
pub mod model;
pub mod validation;

pub use file_loader::load_from_file;
pub use model::{Config, EngineConfig, LoggingConfig, RemainderPolicy, SimulationConfig};
pub use validation::ConfigValidator;
