//! Engine process launcher

use super::client::RpcEngine;
use super::error::EngineError;
use super::transport::StdioTransport;
use super::{Engine, EngineLauncher};
use crate::config::EngineConfig;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, instrument};

/// Launches the engine as a child process speaking JSON-RPC on stdio
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    config: EngineConfig,
}

impl ProcessLauncher {
    /// Create a launcher for the configured engine command
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[async_trait]
impl EngineLauncher for ProcessLauncher {
    #[instrument(skip(self), level = "debug")]
    async fn launch(&self) -> Result<Box<dyn Engine>, EngineError> {
        let started = Instant::now();
        let transport = StdioTransport::spawn_with(
            &self.config.command,
            &self.config.args,
            &self.config.env,
            self.config.working_dir.as_deref(),
        )?
        .with_close_timeout(self.config.close_timeout());

        let mut engine = RpcEngine::new(
            Box::new(transport),
            self.config.entry_point.clone(),
            self.config.result_arity,
        );

        match engine.initialize().await {
            Ok(_) => {
                debug!(
                    command = %self.config.command,
                    "engine started in {:.2}s",
                    started.elapsed().as_secs_f64()
                );
                Ok(Box::new(engine))
            }
            Err(e) => {
                let _ = engine.close().await;
                Err(EngineError::start(format!("Engine handshake failed: {}", e)))
            }
        }
    }
}
