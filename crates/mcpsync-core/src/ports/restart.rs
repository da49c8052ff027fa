//! Restart signal port.
//!
//! The proxy process only picks up definition changes on restart, so the
//! write path fires this signal exactly once after each successful
//! document write, after the write completes.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the restart signal.
#[derive(Debug, Error)]
pub enum RestartError {
    /// The supervisor could not restart the proxy.
    #[error("failed to restart proxy: {0}")]
    Failed(String),
}

/// Signal to the collaborator supervising the proxy process.
#[async_trait]
pub trait RestartSignal: Send + Sync {
    /// Ask the supervisor to restart the proxy so it reloads definitions.
    async fn restart(&self) -> Result<(), RestartError>;
}

/// No-op restart signal for tests and headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRestart;

#[async_trait]
impl RestartSignal for NoopRestart {
    async fn restart(&self) -> Result<(), RestartError> {
        Ok(())
    }
}
