//! Configuration validation

use crate::config::model::{Config, EngineConfig, LoggingConfig, SimulationConfig};
use crate::error::{SimError, SimResult};
use crate::schedule::StepPlan;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration
    pub fn validate(config: &Config) -> SimResult<()> {
        Self::validate_simulation(&config.simulation)?;
        Self::validate_engine(&config.engine)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validate control loop parameters
    pub fn validate_simulation(sim: &SimulationConfig) -> SimResult<()> {
        if !sim.dt.is_finite() || sim.dt <= 0.0 {
            return Err(SimError::config(format!(
                "dt must be a positive finite number, got {}",
                sim.dt
            )));
        }

        if !sim.horizon.is_finite() || sim.horizon < 0.0 {
            return Err(SimError::config(format!(
                "horizon must be a non-negative finite number, got {}",
                sim.horizon
            )));
        }

        for (name, value) in [
            ("initial_pressure", sim.initial_pressure),
            ("permeability", sim.permeability),
            ("injection_rate", sim.injection_rate),
        ] {
            if !value.is_finite() {
                return Err(SimError::config(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }

        if sim.log_interval == 0 {
            return Err(SimError::config("log_interval must be at least 1"));
        }

        // Enforces the remainder policy
        StepPlan::from_config(sim)?;

        Ok(())
    }

    /// Validate engine launch parameters
    pub fn validate_engine(engine: &EngineConfig) -> SimResult<()> {
        if engine.command.trim().is_empty() {
            return Err(SimError::config("engine.command cannot be empty"));
        }

        if engine.entry_point.trim().is_empty() {
            return Err(SimError::config("engine.entry_point cannot be empty"));
        }

        if engine.result_arity == 0 {
            return Err(SimError::config("engine.result_arity must be at least 1"));
        }

        for (name, secs) in [
            ("start_timeout_secs", engine.start_timeout_secs),
            ("call_timeout_secs", engine.call_timeout_secs),
            ("close_timeout_secs", engine.close_timeout_secs),
        ] {
            if secs == 0 {
                return Err(SimError::config(format!(
                    "engine.{} must be greater than 0",
                    name
                )));
            }
        }

        if let Some(dir) = &engine.working_dir {
            if !dir.is_dir() {
                return Err(SimError::config_with_context(
                    format!("engine.working_dir '{}' is not a directory", dir.display()),
                    "The engine resolves its model files from this directory",
                ));
            }
        }

        Ok(())
    }

    /// Validate logging configuration
    pub fn validate_logging(logging: &LoggingConfig) -> SimResult<()> {
        let level = logging.level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            return Err(SimError::config(format!(
                "Unknown log level '{}'",
                logging.level
            )));
        }

        if !["pretty", "compact", "json"].contains(&logging.format.as_str()) {
            return Err(SimError::config(format!(
                "Unknown log format '{}'. Valid formats are: pretty, compact, json",
                logging.format
            )));
        }

        Ok(())
    }
}
