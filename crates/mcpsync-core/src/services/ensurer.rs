//! OpenAI connection ensurer.
//!
//! The remote system reaches its upstream model runtime through an
//! OpenAI-compatible connection. A fresh deployment starts without one, so
//! chat would silently have no models; this service guarantees the
//! configured endpoint is present and enabled, touching nothing else in
//! the list.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::error::SyncResult;
use crate::ports::{OpenAiConnection, OpenAiSettings, WebUiApi};
use crate::services::queue::PassQueue;
use crate::settings::SyncSettings;

/// Guarantees the configured OpenAI endpoint exists in the remote
/// connection settings.
pub struct ConnectionEnsurer {
    api: Arc<dyn WebUiApi>,
    queue: Arc<PassQueue>,
    settings: SyncSettings,
}

impl ConnectionEnsurer {
    /// Create an ensurer sharing the given pass queue.
    pub fn new(api: Arc<dyn WebUiApi>, queue: Arc<PassQueue>, settings: SyncSettings) -> Self {
        Self {
            api,
            queue,
            settings,
        }
    }

    /// Make sure the configured endpoint is present, keyed and enabled.
    ///
    /// Runs on the shared pass queue so it never interleaves with a
    /// reconciliation pass. Returns `true` when the remote settings were
    /// rewritten, `false` when they were already in the desired state.
    pub async fn ensure(&self) -> SyncResult<bool> {
        let api = Arc::clone(&self.api);
        let url = self.settings.openai_url.clone();
        let key = self.settings.openai_key.clone();

        let pass = self.queue.enqueue(async move { run_pass(api, url, key).await });
        pass.await
            .map_err(|_| crate::error::SyncError::Io("reconciliation queue shut down".to_string()))?
    }
}

async fn run_pass(api: Arc<dyn WebUiApi>, url: String, key: String) -> SyncResult<bool> {
    let mut settings = api.openai_config().await?;

    if !ensure_connection(&mut settings, &url, &key) {
        tracing::debug!(%url, "OpenAI connection already present");
        return Ok(false);
    }

    tracing::info!(%url, "writing OpenAI connection settings");
    api.set_openai_config(&settings).await?;
    Ok(true)
}

/// Idempotent insert-or-normalize of the endpoint. Returns whether the
/// settings changed.
///
/// Match is by exact URL. Foreign connections keep their position, key and
/// config; only the matched (or appended) record is touched.
fn ensure_connection(settings: &mut OpenAiSettings, url: &str, key: &str) -> bool {
    let mut changed = false;

    if !settings.enabled {
        settings.enabled = true;
        changed = true;
    }

    match settings
        .connections
        .iter_mut()
        .find(|connection| connection.url == url)
    {
        Some(existing) => {
            if existing.key != key {
                existing.key = key.to_string();
                changed = true;
            }
            if !connection_enabled(&existing.config) {
                set_enabled(&mut existing.config, true);
                changed = true;
            }
        }
        None => {
            settings.connections.push(OpenAiConnection {
                url: url.to_string(),
                key: key.to_string(),
                config: json!({ "enable": true }),
            });
            changed = true;
        }
    }

    changed
}

/// A connection counts as enabled unless its config explicitly says
/// `"enable": false`.
fn connection_enabled(config: &Value) -> bool {
    config.get("enable").and_then(Value::as_bool).unwrap_or(true)
}

fn set_enabled(config: &mut Value, enabled: bool) {
    if !config.is_object() {
        *config = json!({});
    }
    config["enable"] = Value::Bool(enabled);
}
