//! Standard I/O transport
//!
//! Spawns the engine as a subprocess and exchanges newline-delimited JSON
//! over its stdin/stdout. The engine's stderr is inherited.

use super::EngineTransport;
use crate::engine::error::EngineError;
use crate::engine::protocol::EngineMessage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

/// Default grace period before a closing engine is killed
const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Stdio transport to an engine process
pub struct StdioTransport {
    /// Child process
    child: Option<Child>,
    /// Stdin writer
    stdin: Option<ChildStdin>,
    /// Stdout reader
    stdout: Option<BufReader<ChildStdout>>,
    /// Line buffer for reading
    line_buffer: String,
    /// Whether connected
    connected: bool,
    /// How long `close` waits for a graceful exit
    close_timeout: Duration,
}

impl StdioTransport {
    /// Spawn a new engine process
    pub fn spawn(command: impl AsRef<str>, args: &[impl AsRef<str>]) -> Result<Self, EngineError> {
        Self::spawn_with(command, args, &HashMap::new(), None)
    }

    /// Spawn with environment variables and an optional working directory
    pub fn spawn_with(
        command: impl AsRef<str>,
        args: &[impl AsRef<str>],
        env: &HashMap<String, String>,
        current_dir: Option<&Path>,
    ) -> Result<Self, EngineError> {
        let mut cmd = Command::new(command.as_ref());

        cmd.args(args.iter().map(|a| a.as_ref()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        for (key, value) in env {
            cmd.env(key, value);
        }

        if let Some(dir) = current_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            EngineError::start(format!(
                "Failed to spawn engine '{}': {}",
                command.as_ref(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::start("Failed to get stdin handle"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::start("Failed to get stdout handle"))?;

        debug!(command = command.as_ref(), pid = ?child.id(), "engine process spawned");

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            stdout: Some(BufReader::new(stdout)),
            line_buffer: String::new(),
            connected: true,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        })
    }

    /// Set the grace period `close` allows before killing the process
    pub fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }
}

#[async_trait]
impl EngineTransport for StdioTransport {
    async fn send(&mut self, message: EngineMessage) -> Result<(), EngineError> {
        let stdin = self.stdin.as_mut().ok_or(EngineError::Closed)?;

        let json = serde_json::to_string(&message)?;

        stdin.write_all(json.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;

        Ok(())
    }

    async fn receive(&mut self) -> Result<EngineMessage, EngineError> {
        let stdout = self.stdout.as_mut().ok_or(EngineError::Closed)?;

        loop {
            self.line_buffer.clear();

            let bytes_read = stdout.read_line(&mut self.line_buffer).await?;

            if bytes_read == 0 {
                self.connected = false;
                return Err(EngineError::transport("Engine closed its output stream"));
            }

            let line = self.line_buffer.trim();
            if line.is_empty() {
                continue;
            }

            return serde_json::from_str(line).map_err(|e| {
                EngineError::protocol(format!("Unparseable engine message: {}", e))
            });
        }
    }

    async fn close(&mut self) -> Result<(), EngineError> {
        self.connected = false;

        // EOF on stdin is the engine's cue to exit
        self.stdin.take();
        self.stdout.take();

        if let Some(mut child) = self.child.take() {
            tokio::select! {
                result = child.wait() => {
                    let status = result.map_err(|e| EngineError::transport(e.to_string()))?;
                    debug!(%status, "engine process exited");
                }
                _ = tokio::time::sleep(self.close_timeout) => {
                    warn!(
                        timeout_ms = self.close_timeout.as_millis() as u64,
                        "engine did not exit in time, killing"
                    );
                    child.kill().await.ok();
                }
            }
        }

        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn abort(&mut self) {
        self.connected = false;
        self.stdin.take();
        self.stdout.take();
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        // Best effort cleanup
        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
        }
    }
}
