//! Core error type for reservoir-loop

use thiserror::Error;

/// Result type alias for reservoir-loop operations
pub type SimResult<T> = Result<T, SimError>;

/// Main error type for a simulation run
#[derive(Error, Debug, Clone)]
pub enum SimError {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// The engine failed to launch, initialize, or register its working directory
    #[error("Engine start error: {message}")]
    EngineStart {
        message: String,
        context: Option<String>,
    },

    /// An engine call failed or returned a malformed result
    #[error("Engine call error: {message}")]
    EngineCall {
        message: String,
        /// Stepping index the call belonged to (0 for the reset call)
        step: Option<usize>,
        context: Option<String>,
    },

    /// An engine call exceeded its deadline
    #[error("Engine call timed out after {millis}ms")]
    Timeout {
        millis: u64,
        step: Option<usize>,
    },

    /// The run was cancelled
    #[error("Run cancelled")]
    Cancelled,

    /// Session lifecycle misuse
    #[error("Session error: {message}")]
    Session {
        message: String,
        context: Option<String>,
    },

    /// Filesystem error
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<std::path::PathBuf>,
        context: Option<String>,
    },
}

impl SimError {
    /// Stable identifier for programmatic handling
    pub fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "SIM_CONFIG",
            Self::EngineStart { .. } => "SIM_ENGINE_START",
            Self::EngineCall { .. } => "SIM_ENGINE_CALL",
            Self::Timeout { .. } => "SIM_TIMEOUT",
            Self::Cancelled => "SIM_CANCELLED",
            Self::Session { .. } => "SIM_SESSION",
            Self::Io { .. } => "SIM_IO",
        }
    }

    /// Additional context, if any was attached
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. }
            | Self::EngineStart { context, .. }
            | Self::EngineCall { context, .. }
            | Self::Session { context, .. }
            | Self::Io { context, .. } => context.as_deref(),
            Self::Timeout { .. } | Self::Cancelled => None,
        }
    }

    /// Stepping index the failure is attributed to, if known
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::EngineCall { step, .. } | Self::Timeout { step, .. } => *step,
            _ => None,
        }
    }
}
