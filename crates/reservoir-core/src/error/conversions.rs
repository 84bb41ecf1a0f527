//! From trait implementations for SimError conversions

use super::types::SimError;
use crate::engine::EngineError;

impl From<std::io::Error> for SimError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(error: serde_json::Error) -> Self {
        Self::engine_call(format!("JSON error: {}", error))
    }
}

/// Engine failures during a call. Start-phase failures are mapped separately
/// by the session manager, which knows the phase.
impl From<EngineError> for SimError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Start { message, context } => Self::EngineStart { message, context },
            other => {
                let code = other.error_code().to_string();
                Self::EngineCall {
                    message: other.to_string(),
                    step: None,
                    context: Some(other.context().map_or(code.clone(), |c| format!("{}: {}", code, c))),
                }
            }
        }
    }
}
