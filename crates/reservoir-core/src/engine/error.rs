//! Engine transport and protocol errors

use thiserror::Error;

/// Errors raised while talking to an engine process
///
/// These are transport-level failures. Deadlines and cancellation are
/// enforced by the session around each call, not here. The session layer maps them onto the
/// run-level taxonomy in [`crate::error::SimError`].
#[derive(Debug, Error, Clone)]
pub enum EngineError {
    /// The engine process could not be spawned or did not answer the handshake
    #[error("Engine start failed: {message}")]
    Start {
        message: String,
        context: Option<String>,
    },

    /// A call reached the engine but its reply is unusable
    #[error("Engine call failed: {message}")]
    Call {
        message: String,
        context: Option<String>,
    },

    /// Pipe or process I/O failure
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        context: Option<String>,
    },

    /// Message framing or JSON-RPC envelope violation
    #[error("Protocol error: {message}")]
    Protocol {
        message: String,
        context: Option<String>,
    },

    /// The engine answered with a JSON-RPC error object
    #[error("Engine error {code}: {message}")]
    Remote {
        code: i32,
        message: String,
        context: Option<String>,
    },

    /// The engine connection has already been shut down
    #[error("Engine connection closed")]
    Closed,
}

impl EngineError {
    /// Create a new Start error
    pub fn start(message: impl Into<String>) -> Self {
        Self::Start {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Call error
    pub fn call(message: impl Into<String>) -> Self {
        Self::Call {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            context: None,
        }
    }

    /// Create a new Remote error
    pub fn remote(code: i32, message: impl Into<String>) -> Self {
        Self::Remote {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Add context to any engine error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let ctx = Some(context.into());
        match &mut self {
            Self::Start { context: c, .. } => *c = ctx,
            Self::Call { context: c, .. } => *c = ctx,
            Self::Transport { context: c, .. } => *c = ctx,
            Self::Protocol { context: c, .. } => *c = ctx,
            Self::Remote { context: c, .. } => *c = ctx,
            Self::Closed => {}
        }
        self
    }

    /// Stable identifier for programmatic handling
    pub fn error_code(&self) -> &str {
        match self {
            Self::Start { .. } => "ENGINE_START",
            Self::Call { .. } => "ENGINE_CALL",
            Self::Transport { .. } => "ENGINE_TRANSPORT",
            Self::Protocol { .. } => "ENGINE_PROTOCOL",
            Self::Remote { .. } => "ENGINE_REMOTE",
            Self::Closed => "ENGINE_CLOSED",
        }
    }

    /// Additional context, if any was attached
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::Start { context, .. }
            | Self::Call { context, .. }
            | Self::Transport { context, .. }
            | Self::Protocol { context, .. }
            | Self::Remote { context, .. } => context.as_deref(),
            Self::Closed => None,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::protocol(err.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::transport(err.to_string())
    }
}
