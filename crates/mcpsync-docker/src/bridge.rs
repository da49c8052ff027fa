//! File bridge over helper processes.
//!
//! Reads and writes the authoritative document inside the stack's config
//! volume. Text going in is base64-encoded and decoded inside the helper,
//! which keeps arbitrary document bytes out of shell argument parsing;
//! large payloads are split into fixed-size chunks to stay clear of
//! argument-length limits, one helper invocation per chunk.
//!
//! Writes are NOT atomic: a crash between chunk invocations leaves a
//! partially written file. Callers that need certainty re-read after
//! writing.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use mcpsync_core::ports::{FileBridge, FileBridgeError};

use crate::helper::{HelperOutput, HelperRunner};
use crate::stack::{ResolvedStack, StackError, StackLocator};

/// Base64 characters per helper invocation. A multiple of 4, so every
/// chunk decodes independently.
const CHUNK_SIZE: usize = 16 * 1024;

/// [`FileBridge`] that reaches the stack's config directory through
/// disposable helper processes.
pub struct DockerFileBridge {
    runner: Arc<dyn HelperRunner>,
    locator: Arc<dyn StackLocator>,
}

impl DockerFileBridge {
    /// Bridge using the given helper runner and stack locator.
    pub fn new(runner: Arc<dyn HelperRunner>, locator: Arc<dyn StackLocator>) -> Self {
        Self { runner, locator }
    }

    async fn resolve(&self) -> Result<ResolvedStack, FileBridgeError> {
        self.locator.locate().await.map_err(|e| match e {
            StackError::NotFound(marker) => {
                FileBridgeError::NotFound(format!("compose stack '{marker}'"))
            }
            StackError::Listing(reason) => FileBridgeError::Io(reason),
        })
    }

    async fn run_helper(&self, dir: &Path, script: &str) -> Result<HelperOutput, FileBridgeError> {
        self.runner
            .run(dir, script)
            .await
            .map_err(|e| FileBridgeError::Io(e.to_string()))
    }
}

/// Single-quote `text` for `sh`, escaping embedded quotes.
fn shell_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// `mkdir -p` prefix for the file's parent, when it has one.
fn ensure_parent_prefix(path: &str) -> String {
    Path::new(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(|parent| format!("mkdir -p {} && ", shell_quote(&parent.to_string_lossy())))
        .unwrap_or_default()
}

#[async_trait]
impl FileBridge for DockerFileBridge {
    async fn read(&self, path: &str) -> Result<String, FileBridgeError> {
        let stack = self.resolve().await?;
        let script = format!("cat {}", shell_quote(path));
        let output = self.run_helper(&stack.config_dir, &script).await?;

        if output.success() {
            return Ok(output.stdout);
        }
        if output.stderr.contains("No such file") {
            return Err(FileBridgeError::NotFound(path.to_string()));
        }
        Err(FileBridgeError::Io(format!(
            "helper read of '{path}' failed with status {}: {}",
            output.status,
            output.stderr.trim()
        )))
    }

    async fn write(&self, path: &str, contents: &str) -> Result<(), FileBridgeError> {
        let stack = self.resolve().await?;
        let encoded = BASE64.encode(contents.as_bytes());
        let quoted_path = shell_quote(path);

        let chunks: Vec<&str> = if encoded.is_empty() {
            vec![""]
        } else {
            encoded
                .as_bytes()
                .chunks(CHUNK_SIZE)
                // chunks of a valid base64 string at 4-char boundaries stay UTF-8
                .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
                .collect()
        };
        tracing::debug!(path, bytes = contents.len(), chunks = chunks.len(), "writing through helper");

        for (index, chunk) in chunks.iter().enumerate() {
            // First invocation creates parents and truncates; the rest append
            let script = if index == 0 {
                format!(
                    "{}printf %s '{chunk}' | base64 -d > {quoted_path}",
                    ensure_parent_prefix(path)
                )
            } else {
                format!("printf %s '{chunk}' | base64 -d >> {quoted_path}")
            };

            let output = self.run_helper(&stack.config_dir, &script).await?;
            if !output.success() {
                return Err(FileBridgeError::Io(format!(
                    "helper write of '{path}' failed at chunk {index} with status {}: {}",
                    output.status,
                    output.stderr.trim()
                )));
            }
        }
        Ok(())
    }
}
