//! JSON-RPC engine client
//!
//! Drives an engine over any [`EngineTransport`]. There is never more than
//! one request in flight, so replies are read inline rather than routed by a
//! background receiver.

use super::error::EngineError;
use super::protocol::{
    ENGINE_PROTOCOL_VERSION, EngineMessage, RequestId, RpcNotification, RpcRequest, methods,
};
use super::transport::EngineTransport;
use super::Engine;
use crate::types::StepRequest;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Engine reachable through a JSON-RPC transport
pub struct RpcEngine {
    /// Transport layer
    transport: Box<dyn EngineTransport>,
    /// Next request ID
    next_id: i64,
    /// Model function called on every invoke
    entry_point: String,
    /// Number of outputs requested from the entry point
    result_arity: u32,
    /// Handshake reply
    server_info: Option<Value>,
    /// Whether close has run
    closed: bool,
}

impl RpcEngine {
    /// Create a client over the given transport
    pub fn new(
        transport: Box<dyn EngineTransport>,
        entry_point: impl Into<String>,
        result_arity: u32,
    ) -> Self {
        Self {
            transport,
            next_id: 1,
            entry_point: entry_point.into(),
            result_arity,
            server_info: None,
            closed: false,
        }
    }

    /// Perform the protocol handshake
    #[instrument(skip(self), level = "debug")]
    pub async fn initialize(&mut self) -> Result<Value, EngineError> {
        if self.server_info.is_some() {
            return Err(EngineError::protocol("Engine already initialized"));
        }

        let params = json!({
            "protocolVersion": ENGINE_PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
        });

        let info = self.call(methods::INITIALIZE, Some(params)).await?;
        debug!(server_info = %info, "engine handshake complete");
        self.server_info = Some(info.clone());
        Ok(info)
    }

    /// Handshake reply, once initialized
    pub fn server_info(&self) -> Option<&Value> {
        self.server_info.as_ref()
    }

    /// Send a request and wait for its response
    async fn call(&mut self, method: &str, params: Option<Value>) -> Result<Value, EngineError> {
        if self.closed {
            return Err(EngineError::Closed);
        }

        let id = self.next_request_id();
        self.transport
            .send(EngineMessage::Request(RpcRequest::new(id, method, params)))
            .await?;

        loop {
            match self.transport.receive().await? {
                EngineMessage::Response(response) if response.id == id => {
                    return response.into_result().map_err(|e| {
                        if let Some(data) = &e.data {
                            debug!(code = e.code, %data, "engine error data");
                        }
                        EngineError::remote(e.code, e.message)
                    });
                }
                EngineMessage::Response(response) => {
                    warn!(expected = %id, received = %response.id, "discarding stray engine response");
                }
                EngineMessage::Notification(notification) => {
                    debug!(method = %notification.method, params = ?notification.params, "engine notification");
                }
                EngineMessage::Request(request) => {
                    warn!(method = %request.method, "ignoring engine-initiated request");
                }
            }
        }
    }

    /// Send a notification (no response expected)
    async fn notify(&mut self, method: &str) -> Result<(), EngineError> {
        self.transport
            .send(EngineMessage::Notification(RpcNotification::new(method)))
            .await
    }

    fn next_request_id(&mut self) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        RequestId(id)
    }
}

#[async_trait]
impl Engine for RpcEngine {
    #[instrument(skip(self), fields(path = %path.display()), level = "debug")]
    async fn register_path(&mut self, path: &Path) -> Result<(), EngineError> {
        let params = json!({ "path": path.to_string_lossy() });
        self.call(methods::REGISTER_PATH, Some(params)).await?;
        Ok(())
    }

    async fn invoke(&mut self, request: &StepRequest) -> Result<Value, EngineError> {
        let params = json!({
            "function": self.entry_point,
            "args": request,
            "nargout": self.result_arity,
        });
        self.call(methods::INVOKE, Some(params)).await
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if self.transport.is_connected() {
            if let Err(e) = self.notify(methods::SHUTDOWN).await {
                debug!(error = %e, "shutdown notification not delivered");
            }
        }
        self.transport.close().await
    }

    fn is_connected(&self) -> bool {
        !self.closed && self.transport.is_connected()
    }

    fn abort(&mut self) {
        self.closed = true;
        self.transport.abort();
    }
}
