//! The reconciliation engine.
//!
//! One pass takes the latest authoritative document text, reads the remote
//! state, computes the minimal-diff target and writes it back only when
//! something actually differs. Two remote surfaces are converged:
//!
//! 1. the tool-server connection list — connections whose URL carries the
//!    proxy base prefix are owned by this system and converge exactly to
//!    the declared set; every other connection is foreign and survives
//!    byte-for-byte;
//! 2. each model's tool-assignment list — only ids carrying the managed
//!    `server:` prefix are ever added or removed.
//!
//! Passes are serialized through the [`PassQueue`]; within one pass the
//! fetch-compute-write sequence is not transactional, and a concurrent
//! remote edit may be clobbered. No optimistic-concurrency token exists in
//! the remote API; the next pass re-converges.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::domain::{ManagedServer, McpConfig};
use crate::error::{SyncError, SyncResult};
use crate::ports::{
    ModelSummary, ToolServerConfig, ToolServerConnection, ToolServerInfo, WebUiApi, WebUiError,
};
use crate::services::queue::PassQueue;
use crate::settings::{SyncSettings, TOOL_ID_PREFIX};

/// What a pass ended up touching. Mostly for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Whether the tool-server connection list was rewritten.
    pub connections_written: bool,
    /// How many models had their tool assignments upserted.
    pub models_updated: usize,
}

/// Reconciles the remote system to the authoritative document.
pub struct Reconciler {
    api: Arc<dyn WebUiApi>,
    queue: Arc<PassQueue>,
    settings: SyncSettings,
}

impl Reconciler {
    /// Create a reconciler sharing the given pass queue.
    pub fn new(api: Arc<dyn WebUiApi>, queue: Arc<PassQueue>, settings: SyncSettings) -> Self {
        Self {
            api,
            queue,
            settings,
        }
    }

    /// Enqueue one reconciliation pass for `document_text` and await it.
    ///
    /// The text is parsed tolerantly: malformed input reconciles as the
    /// empty document, which removes every owned connection and strips the
    /// managed tool ids from every model.
    pub async fn reconcile(&self, document_text: &str) -> SyncResult<SyncReport> {
        let document = McpConfig::parse(document_text);
        let servers = document.managed_servers(self.settings.proxy_base());

        let api = Arc::clone(&self.api);
        let base = self.settings.proxy_base().to_string();

        let pass = self
            .queue
            .enqueue(async move { run_pass(api, base, servers).await });
        pass.await
            .map_err(|_| SyncError::Io("reconciliation queue shut down".to_string()))?
    }
}

/// One full diff-and-apply pass. Value-typed inputs only; the queue worker
/// owns the execution.
async fn run_pass(
    api: Arc<dyn WebUiApi>,
    proxy_base: String,
    servers: Vec<ManagedServer>,
) -> SyncResult<SyncReport> {
    if servers.is_empty() {
        tracing::debug!("document declares no servers; converging remote to empty");
    }

    let connections_written = reconcile_connections(api.as_ref(), &proxy_base, &servers).await?;
    let models_updated = reconcile_model_assignments(api.as_ref(), &servers).await?;

    tracing::info!(
        connections_written,
        models_updated,
        server_count = servers.len(),
        "reconciliation pass complete"
    );

    Ok(SyncReport {
        connections_written,
        models_updated,
    })
}

/// Ownership test: the URL-prefix match is the only signal the remote
/// schema offers to tell owned entries from foreign ones.
fn is_owned_url(url: &str, proxy_base: &str) -> bool {
    url.starts_with(proxy_base)
}

/// Build the deterministic remote connection for a managed server. The
/// same entity always yields the same object, so list comparison is a true
/// idempotence check.
fn build_connection(server: &ManagedServer) -> Value {
    let connection = ToolServerConnection {
        url: server.url.clone(),
        path: "openapi.json".to_string(),
        connection_type: "openapi".to_string(),
        auth_type: "none".to_string(),
        headers: Map::new(),
        key: String::new(),
        config: ToolServerConfig::default(),
        spec_type: "url".to_string(),
        spec: String::new(),
        info: ToolServerInfo {
            id: server.id.clone(),
            name: server.name.clone(),
            description: server.description.clone().unwrap_or_default(),
        },
    };
    // A struct of strings and maps always serializes
    serde_json::to_value(connection).unwrap_or(Value::Null)
}

/// Converge the remote tool-server connection list.
///
/// `desired = foreign ++ build_connection(servers)`; foreign entries are
/// carried as the raw values the remote returned.
async fn reconcile_connections(
    api: &dyn WebUiApi,
    proxy_base: &str,
    servers: &[ManagedServer],
) -> SyncResult<bool> {
    let current = api.tool_server_connections().await?;

    let mut desired: Vec<Value> = current
        .iter()
        .filter(|connection| {
            !connection
                .get("url")
                .and_then(Value::as_str)
                .is_some_and(|url| is_owned_url(url, proxy_base))
        })
        .cloned()
        .collect();
    desired.extend(servers.iter().map(build_connection));

    if connection_lists_equal(&current, &desired) {
        tracing::debug!("tool-server connections already converged");
        return Ok(false);
    }

    tracing::info!(
        current = current.len(),
        desired = desired.len(),
        "rewriting tool-server connection list"
    );
    api.set_tool_server_connections(&desired).await?;
    Ok(true)
}

/// Field-by-field comparison of two connection lists.
///
/// Compared per entry: url, path, type, auth_type, key, normalized
/// headers, deep-equal config, spec_type, spec, info.{id,name,description}.
/// Anything else the remote stores on an entry is ignored, so
/// remote-side bookkeeping fields do not cause rewrite churn.
fn connection_lists_equal(current: &[Value], desired: &[Value]) -> bool {
    current.len() == desired.len()
        && current
            .iter()
            .zip(desired)
            .all(|(a, b)| connections_equal(a, b))
}

fn connections_equal(a: &Value, b: &Value) -> bool {
    const STRING_FIELDS: &[&str] = &["url", "path", "type", "auth_type", "key", "spec_type", "spec"];
    const INFO_FIELDS: &[&str] = &["id", "name", "description"];

    let str_field = |v: &Value, field: &str| -> String {
        v.get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    if STRING_FIELDS
        .iter()
        .any(|field| str_field(a, field) != str_field(b, field))
    {
        return false;
    }

    // Missing and null headers normalize to the empty object
    let headers = |v: &Value| -> Map<String, Value> {
        v.get("headers")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    };
    if headers(a) != headers(b) {
        return false;
    }

    if a.get("config").unwrap_or(&Value::Null) != b.get("config").unwrap_or(&Value::Null) {
        return false;
    }

    let info_field = |v: &Value, field: &str| -> String {
        v.get("info")
            .and_then(|info| info.get(field))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    INFO_FIELDS
        .iter()
        .all(|field| info_field(a, field) == info_field(b, field))
}

/// Converge every model's tool-assignment list.
///
/// Managed-prefix ids are stripped, foreign ids preserved verbatim, then
/// the desired ids appended (skipping ones already present). Only models
/// whose list actually changes are upserted.
async fn reconcile_model_assignments(
    api: &dyn WebUiApi,
    servers: &[ManagedServer],
) -> SyncResult<usize> {
    let mut desired_ids: Vec<String> = Vec::with_capacity(servers.len());
    for server in servers {
        let tool_id = format!("{TOOL_ID_PREFIX}{}", server.id);
        if !desired_ids.contains(&tool_id) {
            desired_ids.push(tool_id);
        }
    }

    let models = api.list_models().await?;
    let mut updated = 0;

    for model in &models {
        let current_ids = model.tool_ids();

        let mut next_ids: Vec<String> = current_ids
            .iter()
            .filter(|id| !id.starts_with(TOOL_ID_PREFIX))
            .cloned()
            .collect();
        for id in &desired_ids {
            if !next_ids.contains(id) {
                next_ids.push(id.clone());
            }
        }

        if next_ids == current_ids {
            continue;
        }

        tracing::debug!(model_id = %model.id, ?next_ids, "updating model tool assignments");
        upsert_model(api, model, &next_ids).await?;
        updated += 1;
    }

    Ok(updated)
}

/// Write a model's merged tool ids, creating the record when the remote
/// only knows the model as a listing entry.
async fn upsert_model(
    api: &dyn WebUiApi,
    summary: &ModelSummary,
    tool_ids: &[String],
) -> Result<(), WebUiError> {
    match api.model_detail(&summary.id).await? {
        None => {
            let payload = build_model_payload(summary, tool_ids);
            tracing::debug!(model_id = %summary.id, "model record absent; creating");
            api.create_model(&payload).await
        }
        Some(mut detail) => {
            apply_tool_assignments(&mut detail, tool_ids);
            match api.update_model(&summary.id, &detail).await {
                // The remote sometimes lists a model before materializing
                // its record; update answers 404 and create is the fallback.
                Err(WebUiError::ModelNotFound(_)) => {
                    tracing::debug!(model_id = %summary.id, "update got 404; creating instead");
                    api.create_model(&detail).await
                }
                other => other,
            }
        }
    }
}

/// Seed a fresh model record from the listing entry.
fn build_model_payload(summary: &ModelSummary, tool_ids: &[String]) -> Value {
    let mut payload = summary.info.clone().unwrap_or_else(|| json!({}));
    if !payload.is_object() {
        payload = json!({});
    }
    payload["id"] = Value::String(summary.id.clone());
    payload["name"] = Value::String(summary.name.clone());
    apply_tool_assignments(&mut payload, tool_ids);
    payload
}

/// Merge the tool ids and the fixed `function_calling` parameter into a
/// model record, creating the nested objects as needed.
fn apply_tool_assignments(model: &mut Value, tool_ids: &[String]) {
    if !model.is_object() {
        *model = json!({});
    }
    for field in ["meta", "params"] {
        if !model[field].is_object() {
            model[field] = json!({});
        }
    }

    model["meta"]["toolIds"] = json!(tool_ids);
    model["params"]["function_calling"] = Value::String("native".to_string());
}
