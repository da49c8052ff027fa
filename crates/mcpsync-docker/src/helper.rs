//! Short-lived helper process primitive.
//!
//! A helper is one disposable process bound to a directory that runs a
//! small shell script and exits. The Docker implementation mounts the
//! directory into a minimal container; the plain-shell implementation runs
//! the same script directly, which lets the chunked-write logic be tested
//! against a temp dir without a Docker daemon.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Image used for helper containers; needs only `sh`, `cat` and `base64`.
pub const HELPER_IMAGE: &str = "busybox:stable";

/// Mount point of the bound directory inside a helper container. Scripts
/// use paths relative to it.
const HELPER_WORKDIR: &str = "/work";

/// Errors from spawning a helper.
#[derive(Debug, Error)]
pub enum HelperError {
    /// The helper process could not be started at all.
    #[error("failed to spawn helper process: {0}")]
    Spawn(String),
}

/// Captured result of one helper run. A non-zero status is data, not an
/// error; the caller decides what it means.
#[derive(Debug, Clone)]
pub struct HelperOutput {
    /// Process exit code (`-1` when terminated by a signal).
    pub status: i32,
    /// Captured stdout, lossily decoded.
    pub stdout: String,
    /// Captured stderr, lossily decoded.
    pub stderr: String,
}

impl HelperOutput {
    /// Whether the helper exited with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    fn from_output(output: Output) -> Self {
        Self {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Run one disposable helper bound to a directory.
#[async_trait]
pub trait HelperRunner: Send + Sync {
    /// Run `script` under `sh -c` with `dir` as the working directory,
    /// waiting for completion and capturing all output.
    async fn run(&self, dir: &Path, script: &str) -> Result<HelperOutput, HelperError>;
}

/// Helper runner backed by `docker run`.
///
/// Each call is `docker run --rm -v <dir>:/work -w /work <image> sh -c
/// <script>`; the container is gone when the call returns.
pub struct DockerCliRunner {
    image: String,
}

impl DockerCliRunner {
    /// Runner using the default helper image.
    #[must_use]
    pub fn new() -> Self {
        Self::with_image(HELPER_IMAGE)
    }

    /// Runner using a custom helper image.
    #[must_use]
    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
        }
    }
}

impl Default for DockerCliRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HelperRunner for DockerCliRunner {
    async fn run(&self, dir: &Path, script: &str) -> Result<HelperOutput, HelperError> {
        tracing::debug!(dir = %dir.display(), script_len = script.len(), "spawning helper container");
        let output = Command::new("docker")
            .arg("run")
            .arg("--rm")
            .arg("-v")
            .arg(format!("{}:{HELPER_WORKDIR}", dir.display()))
            .arg("-w")
            .arg(HELPER_WORKDIR)
            .arg(&self.image)
            .arg("sh")
            .arg("-c")
            .arg(script)
            .output()
            .await
            .map_err(|e| HelperError::Spawn(e.to_string()))?;
        Ok(HelperOutput::from_output(output))
    }
}

/// Helper runner that executes the script with the host shell instead of a
/// container. Used in tests; also usable when the target directory is
/// directly reachable.
#[derive(Debug, Default)]
pub struct ShellRunner;

impl ShellRunner {
    /// Create a shell runner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HelperRunner for ShellRunner {
    async fn run(&self, dir: &Path, script: &str) -> Result<HelperOutput, HelperError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(script)
            .current_dir(dir)
            .output()
            .await
            .map_err(|e| HelperError::Spawn(e.to_string()))?;
        Ok(HelperOutput::from_output(output))
    }
}
