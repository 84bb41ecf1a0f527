//! Constructor methods for SimError

use super::types::SimError;
use std::path::PathBuf;

impl SimError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new engine start error
    pub fn engine_start(message: impl Into<String>) -> Self {
        Self::EngineStart {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new engine call error
    pub fn engine_call(message: impl Into<String>) -> Self {
        Self::EngineCall {
            message: message.into(),
            step: None,
            context: None,
        }
    }

    /// Create a new session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
            context: None,
        }
    }

    /// Create an IO error tied to a path
    pub fn io_with_path(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
            context: None,
        }
    }

    /// Attribute an engine call or timeout failure to a stepping index
    pub fn at_step(mut self, index: usize) -> Self {
        match &mut self {
            Self::EngineCall { step, .. } | Self::Timeout { step, .. } => *step = Some(index),
            _ => {}
        }
        self
    }

    /// Add context to any error that carries it
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = Some(context.into());
        match &mut self {
            Self::Config { context: c, .. }
            | Self::EngineStart { context: c, .. }
            | Self::EngineCall { context: c, .. }
            | Self::Session { context: c, .. }
            | Self::Io { context: c, .. } => *c = ctx,
            Self::Timeout { .. } | Self::Cancelled => {}
        }
        self
    }
}
