//! Compose-backed restart signal.
//!
//! The proxy container reloads its server definitions only on restart, so
//! after every successful document write the service is bounced through
//! `docker compose restart` against the resolved stack.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use mcpsync_core::ports::{RestartError, RestartSignal};

use crate::stack::StackLocator;

/// Compose service name of the MCP proxy container.
pub const PROXY_SERVICE: &str = "mcpo";

/// [`RestartSignal`] that restarts one service of the resolved stack.
pub struct ComposeRestartSignal {
    locator: Arc<dyn StackLocator>,
    service: String,
}

impl ComposeRestartSignal {
    /// Signal restarting the default proxy service.
    #[must_use]
    pub fn new(locator: Arc<dyn StackLocator>) -> Self {
        Self::for_service(locator, PROXY_SERVICE)
    }

    /// Signal restarting a custom service of the stack.
    #[must_use]
    pub fn for_service(locator: Arc<dyn StackLocator>, service: impl Into<String>) -> Self {
        Self {
            locator,
            service: service.into(),
        }
    }
}

#[async_trait]
impl RestartSignal for ComposeRestartSignal {
    async fn restart(&self) -> Result<(), RestartError> {
        let stack = self
            .locator
            .locate()
            .await
            .map_err(|e| RestartError::Failed(e.to_string()))?;

        tracing::info!(stack = %stack.name, service = %self.service, "restarting proxy service");
        let output = Command::new("docker")
            .args(["compose", "-p", &stack.name, "restart", &self.service])
            .output()
            .await
            .map_err(|e| RestartError::Failed(e.to_string()))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(RestartError::Failed(format!(
                "docker compose restart exited with {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )))
        }
    }
}
