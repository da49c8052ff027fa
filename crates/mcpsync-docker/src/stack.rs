//! Compose-stack resolution.
//!
//! Before any file access the deployed stack carrying the config volume
//! must be located: `docker compose ls --format json` lists running
//! stacks, the marker substring picks ours, and the stack's first declared
//! compose file yields the config directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;

/// Substring identifying the managed stack among all deployed stacks.
pub const STACK_MARKER: &str = "mcp-webui";

/// Errors from stack resolution.
#[derive(Debug, Error)]
pub enum StackError {
    /// No deployed stack matches the marker, or its metadata carries no
    /// usable compose-file path.
    #[error("no deployed stack matching '{0}' was found")]
    NotFound(String),

    /// `docker compose ls` failed or returned unparseable output.
    #[error("failed to list compose stacks: {0}")]
    Listing(String),
}

/// A located stack: its compose project name and the directory its config
/// files live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStack {
    /// Compose project name, as passed to `docker compose -p`.
    pub name: String,
    /// Directory containing the stack's compose file; the authoritative
    /// document lives below it.
    pub config_dir: PathBuf,
}

/// Locate the deployed stack the adapter should operate on.
#[async_trait]
pub trait StackLocator: Send + Sync {
    /// Resolve the stack, or `StackError::NotFound` when it is not
    /// deployed.
    async fn locate(&self) -> Result<ResolvedStack, StackError>;
}

/// One entry of `docker compose ls --format json`.
#[derive(Debug, Deserialize)]
struct StackEntry {
    #[serde(rename = "Name")]
    name: String,
    /// Comma-separated list of compose file paths.
    #[serde(rename = "ConfigFiles", default)]
    config_files: String,
}

/// Parse a compose listing. Newer CLI versions emit a JSON array; older
/// ones emit one JSON object per line.
fn parse_listing(listing: &str) -> Vec<StackEntry> {
    if let Ok(entries) = serde_json::from_str(listing) {
        return entries;
    }
    listing
        .lines()
        .filter_map(|line| serde_json::from_str(line.trim()).ok())
        .collect()
}

/// Pick the marked stack out of a compose listing.
fn select_stack(listing: &str, marker: &str) -> Option<ResolvedStack> {
    parse_listing(listing)
        .into_iter()
        .filter(|entry| entry.name.contains(marker))
        .find_map(|entry| {
            let first_file = entry.config_files.split(',').next()?.trim();
            if first_file.is_empty() {
                return None;
            }
            let config_dir = Path::new(first_file).parent()?.to_path_buf();
            Some(ResolvedStack {
                name: entry.name,
                config_dir,
            })
        })
}

/// Locator backed by the `docker compose` CLI.
pub struct ComposeStackLocator {
    marker: String,
}

impl ComposeStackLocator {
    /// Locator using the default stack marker.
    #[must_use]
    pub fn new() -> Self {
        Self::with_marker(STACK_MARKER)
    }

    /// Locator matching a custom marker substring.
    #[must_use]
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for ComposeStackLocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StackLocator for ComposeStackLocator {
    async fn locate(&self) -> Result<ResolvedStack, StackError> {
        let output = Command::new("docker")
            .args(["compose", "ls", "--format", "json"])
            .output()
            .await
            .map_err(|e| StackError::Listing(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StackError::Listing(stderr.trim().to_string()));
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        let stack = select_stack(&listing, &self.marker)
            .ok_or_else(|| StackError::NotFound(self.marker.clone()))?;
        tracing::debug!(stack = %stack.name, dir = %stack.config_dir.display(), "resolved compose stack");
        Ok(stack)
    }
}

/// Locator pinned to a known directory. Used in tests and when the stack
/// location is configured explicitly.
pub struct FixedStack {
    stack: ResolvedStack,
}

impl FixedStack {
    /// Pin the locator to `config_dir` under the given project name.
    #[must_use]
    pub fn new(name: impl Into<String>, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            stack: ResolvedStack {
                name: name.into(),
                config_dir: config_dir.into(),
            },
        }
    }
}

#[async_trait]
impl StackLocator for FixedStack {
    async fn locate(&self) -> Result<ResolvedStack, StackError> {
        Ok(self.stack.clone())
    }
}
