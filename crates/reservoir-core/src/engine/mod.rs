//! External simulation engine integration
//!
//! The engine is an opaque, stateful collaborator. This module defines the
//! capability set the rest of the crate relies on ([`Engine`] and
//! [`EngineLauncher`]) and two implementations of it:
//!
//! - [`RpcEngine`] / [`ProcessLauncher`]: a child process spoken to over
//!   newline-delimited JSON-RPC on stdio
//! - [`ScriptedEngine`] / [`ScriptedLauncher`]: an in-process fake with a
//!   call log, for deterministic tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use reservoir_core::engine::{EngineLauncher, ProcessLauncher};
//!
//! let launcher = ProcessLauncher::new(config.engine.clone());
//! let mut engine = launcher.launch().await?;
//! engine.register_path(&working_dir).await?;
//! let reply = engine.invoke(&StepRequest::step(150.0, 0.1)).await?;
//! engine.close().await?;
//! ```

pub mod client;
pub mod error;
pub mod launcher;
pub mod protocol;
pub mod scripted;
pub mod transport;

pub use client::RpcEngine;
pub use error::EngineError;
pub use launcher::ProcessLauncher;
pub use protocol::{EngineMessage, RequestId};
pub use scripted::{CallLog, RecordedCall, ScriptedEngine, ScriptedLauncher};
pub use transport::{EngineTransport, StdioTransport};

use crate::types::StepRequest;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

/// A connected engine instance
///
/// Calls are strictly sequential: the caller awaits each one before issuing
/// the next. Every call may mutate hidden engine state.
#[async_trait]
pub trait Engine: Send {
    /// Add a directory to the engine's model search path
    async fn register_path(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Run the model entry point once and return its raw result
    async fn invoke(&mut self, request: &StepRequest) -> Result<Value, EngineError>;

    /// Shut the engine down
    async fn close(&mut self) -> Result<(), EngineError>;

    /// Check if the engine is still reachable
    fn is_connected(&self) -> bool;

    /// Tear down without waiting. Used when a session is dropped unclosed.
    fn abort(&mut self) {}
}

/// Something that can bring up an [`Engine`]
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    /// Start and initialize a new engine instance
    async fn launch(&self) -> Result<Box<dyn Engine>, EngineError>;
}
