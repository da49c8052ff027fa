//! Bearer credential storage.
//!
//! The remote config API needs a bearer token that is supplied externally.
//! Absence of a token is a normal, reportable state — not a crash.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the credential store.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The backing storage failed.
    #[error("credential storage error at {path}: {reason}")]
    Storage {
        /// Store location
        path: PathBuf,
        /// What went wrong
        reason: String,
    },
}

/// Get/set a single bearer token string.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The configured token, or `None` when unset.
    async fn get_token(&self) -> Result<Option<String>, CredentialError>;

    /// Store the token.
    async fn set_token(&self, token: &str) -> Result<(), CredentialError>;

    /// Forget the token.
    async fn clear_token(&self) -> Result<(), CredentialError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

/// JSON-file-backed credential store.
///
/// A missing or unreadable file reads as "no token configured" rather than
/// an error, matching the tolerant-read philosophy of the document model.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> CredentialFile {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    fn save(&self, file: &CredentialFile) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CredentialError::Storage {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        }
        let text = serde_json::to_string_pretty(file).map_err(|e| CredentialError::Storage {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, text).map_err(|e| CredentialError::Storage {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get_token(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.load().token.filter(|t| !t.is_empty()))
    }

    async fn set_token(&self, token: &str) -> Result<(), CredentialError> {
        self.save(&CredentialFile {
            token: Some(token.to_string()),
        })
    }

    async fn clear_token(&self) -> Result<(), CredentialError> {
        self.save(&CredentialFile { token: None })
    }
}

/// In-memory credential store for tests.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get_token(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.token.lock().unwrap().clone())
    }

    async fn set_token(&self, token: &str) -> Result<(), CredentialError> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), CredentialError> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}
