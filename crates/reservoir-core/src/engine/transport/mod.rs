//! Engine transport layer
//!
//! A transport moves [`EngineMessage`]s to and from an engine. The only
//! production transport is [`StdioTransport`], which talks to a child process.

pub mod stdio;

pub use stdio::StdioTransport;

use super::error::EngineError;
use super::protocol::EngineMessage;
use async_trait::async_trait;

/// Transport trait for engine communication
#[async_trait]
pub trait EngineTransport: Send {
    /// Send a message
    async fn send(&mut self, message: EngineMessage) -> Result<(), EngineError>;

    /// Receive a message
    async fn receive(&mut self) -> Result<EngineMessage, EngineError>;

    /// Close the transport
    async fn close(&mut self) -> Result<(), EngineError>;

    /// Check if the transport is connected
    fn is_connected(&self) -> bool;

    /// Tear down without waiting. Used when a session is dropped unclosed.
    fn abort(&mut self) {}
}
