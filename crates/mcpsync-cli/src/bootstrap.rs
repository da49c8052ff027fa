//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together:
//! the Docker file bridge, the Open WebUI client, the credential store and
//! the reconciliation services. Command handlers receive the composed
//! [`SyncContext`] and delegate to it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use mcpsync_core::credentials::{CredentialStore, FileCredentialStore};
use mcpsync_core::ports::{FileBridge, NoopRestart, RestartSignal, WebUiApi};
use mcpsync_core::services::{ConnectionEnsurer, PassQueue, Reconciler};
use mcpsync_core::settings::SyncSettings;
use mcpsync_docker::{
    ComposeRestartSignal, ComposeStackLocator, DockerCliRunner, DockerFileBridge, FixedStack,
    HelperRunner, ShellRunner, StackLocator,
};
use mcpsync_openwebui::WebUiClient;

use crate::parser::Cli;

/// Fully composed application context for command handlers.
pub struct SyncContext {
    /// Effective settings after CLI overrides.
    pub settings: SyncSettings,
    /// Bridge to the authoritative document.
    pub bridge: Arc<dyn FileBridge>,
    /// Credential store for the Open WebUI token.
    pub credentials: Arc<dyn CredentialStore>,
    /// Restart signal fired after successful writes.
    pub restart: Arc<dyn RestartSignal>,
    /// Reconciliation engine.
    pub reconciler: Reconciler,
    /// OpenAI connection ensurer.
    pub ensurer: ConnectionEnsurer,
}

/// Location of the stored API token.
fn credentials_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config/mcpsync/credentials.json")
}

/// Wire all concrete adapters. Must be called from within a tokio runtime
/// (the pass queue spawns its worker here).
pub fn bootstrap(cli: &Cli) -> Result<SyncContext> {
    let mut settings = SyncSettings::with_defaults();
    if let Some(url) = &cli.webui_url {
        settings.webui_base_url.clone_from(url);
    }
    if let Some(url) = &cli.proxy_url {
        settings.proxy_base_url.clone_from(url);
    }

    // Local-directory mode skips the compose stack entirely: files are
    // touched with the host shell and no proxy restart is attempted.
    let (locator, runner, restart): (
        Arc<dyn StackLocator>,
        Arc<dyn HelperRunner>,
        Arc<dyn RestartSignal>,
    ) = match &cli.stack_dir {
        Some(dir) => {
            tracing::info!(dir, "local-directory mode; compose stack resolution disabled");
            (
                Arc::new(FixedStack::new("local", dir)),
                Arc::new(ShellRunner::new()),
                Arc::new(NoopRestart),
            )
        }
        None => {
            let locator = Arc::new(ComposeStackLocator::new());
            (
                Arc::clone(&locator) as Arc<dyn StackLocator>,
                Arc::new(DockerCliRunner::new()),
                Arc::new(ComposeRestartSignal::new(locator)),
            )
        }
    };

    let bridge: Arc<dyn FileBridge> = Arc::new(DockerFileBridge::new(runner, locator));
    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::new(
        credentials_path(),
    ));
    let api: Arc<dyn WebUiApi> = Arc::new(
        WebUiClient::new(&settings.webui_base_url, Arc::clone(&credentials)).with_context(
            || format!("invalid Open WebUI base URL '{}'", settings.webui_base_url),
        )?,
    );

    let queue = Arc::new(PassQueue::new());
    let reconciler = Reconciler::new(Arc::clone(&api), Arc::clone(&queue), settings.clone());
    let ensurer = ConnectionEnsurer::new(api, queue, settings.clone());

    Ok(SyncContext {
        settings,
        bridge,
        credentials,
        restart,
        reconciler,
        ensurer,
    })
}
