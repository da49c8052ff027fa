//! Host file bridge port.
//!
//! The authoritative document lives on a filesystem the caller cannot touch
//! directly (a Docker volume). Implementations reach it by spawning
//! short-lived helper processes mounted against that filesystem.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the host file bridge.
#[derive(Debug, Error)]
pub enum FileBridgeError {
    /// The deployed stack, volume or file could not be resolved.
    #[error("not found: {0}")]
    NotFound(String),

    /// A helper process failed or its output was unusable.
    #[error("file bridge I/O error: {0}")]
    Io(String),
}

/// Read/write access to a small text file behind a process indirection.
///
/// # Design Rules
///
/// - Paths are relative to the resolved stack config directory.
/// - `write` is **not atomic**: large payloads go out as successive helper
///   invocations, so a crash mid-write can leave a partial file. Callers
///   that need strict consistency must re-verify on the next read.
#[async_trait]
pub trait FileBridge: Send + Sync {
    /// Read the file's bytes back as text.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the stack or file cannot be resolved
    /// - `Io` on helper failure
    async fn read(&self, path: &str) -> Result<String, FileBridgeError>;

    /// Overwrite the file with `contents`, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the stack cannot be resolved
    /// - `Io` on helper failure (the target may be partially written)
    async fn write(&self, path: &str, contents: &str) -> Result<(), FileBridgeError>;
}
