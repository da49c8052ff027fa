//! Error taxonomy shared by the sync services.
//!
//! Port-level errors (`FileBridgeError`, `WebUiError`, ...) are mapped into
//! this small taxonomy at the service boundary, so callers only ever see
//! four failure categories: missing credential, missing resource, malformed
//! document, and I/O.

use thiserror::Error;

use crate::ports::{FileBridgeError, RestartError, WebUiError};

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors surfaced by the reconciliation services.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No Open WebUI API token is configured. Reported to the user as an
    /// actionable prompt, not a failure of the sync machinery.
    #[error("no Open WebUI API token is configured")]
    Auth,

    /// A stack, file or model is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// The document text is not well-formed JSON or not an object.
    /// Write-time format errors are surfaced before any network call.
    #[error("configuration document is malformed: {0}")]
    Format(String),

    /// Helper-process or network failure.
    #[error("{0}")]
    Io(String),
}

impl From<WebUiError> for SyncError {
    fn from(err: WebUiError) -> Self {
        match err {
            WebUiError::MissingToken => Self::Auth,
            WebUiError::ModelNotFound(id) => Self::NotFound(format!("model '{id}'")),
            other => Self::Io(other.to_string()),
        }
    }
}

impl From<FileBridgeError> for SyncError {
    fn from(err: FileBridgeError) -> Self {
        match err {
            FileBridgeError::NotFound(what) => Self::NotFound(what),
            FileBridgeError::Io(reason) => Self::Io(reason),
        }
    }
}

impl From<RestartError> for SyncError {
    fn from(err: RestartError) -> Self {
        Self::Io(err.to_string())
    }
}
