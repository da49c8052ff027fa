//! Open WebUI configuration API port.
//!
//! Thin typed operations against the remote config endpoints. The remote
//! store has no namespace or owner field, so tool-server connections are
//! carried as raw JSON values — foreign entries (created by other tools)
//! must survive a round trip byte-for-byte.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors from the remote config client.
#[derive(Debug, Error)]
pub enum WebUiError {
    /// No bearer credential is configured. Every operation fails fast with
    /// this before any network I/O.
    #[error("no Open WebUI API token is configured")]
    MissingToken,

    /// The model does not exist as a full record. A first-class semantic
    /// outcome: the reconciler falls back to create.
    #[error("model '{0}' not found")]
    ModelNotFound(String),

    /// Request failed with an HTTP error status.
    #[error("Open WebUI request failed with status {status}: {url}")]
    Api {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Network or HTTP client error.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be interpreted.
    #[error("invalid response from Open WebUI: {0}")]
    InvalidResponse(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-connection config block inside a tool-server connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolServerConfig {
    /// Whether the connection is active.
    pub enable: bool,
    /// Function names exposed through this connection (empty = all).
    #[serde(default)]
    pub function_name_filter_list: Vec<String>,
    /// Access control document; `null` means public.
    #[serde(default)]
    pub access_control: Value,
}

impl Default for ToolServerConfig {
    fn default() -> Self {
        Self {
            enable: true,
            function_name_filter_list: Vec::new(),
            access_control: Value::Null,
        }
    }
}

/// Display metadata of a tool-server connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolServerInfo {
    /// Stable identifier (the managed server id for owned entries).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// One entry in the remote tool-server connection list.
///
/// Ownership test: a connection is managed by this system iff its `url` is
/// prefixed by the proxy base URL. That is the only signal the remote
/// schema offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolServerConnection {
    /// Endpoint URL; `<proxy-base>/<id>` for managed entries.
    pub url: String,
    /// Spec path below the URL.
    pub path: String,
    /// Connection type (`"openapi"`).
    #[serde(rename = "type")]
    pub connection_type: String,
    /// Authentication mode (`"none"` for proxy-local servers).
    pub auth_type: String,
    /// Extra request headers.
    #[serde(default)]
    pub headers: serde_json::Map<String, Value>,
    /// Bearer key sent when `auth_type` requires one.
    #[serde(default)]
    pub key: String,
    /// Per-connection config block.
    pub config: ToolServerConfig,
    /// How the spec is obtained (`"url"`).
    pub spec_type: String,
    /// Inline spec body when `spec_type` is `"json"`; empty otherwise.
    #[serde(default)]
    pub spec: String,
    /// Display metadata.
    pub info: ToolServerInfo,
}

/// One model as listed by the remote system.
///
/// Only the fields the reconciler needs are typed; everything else rides
/// along in `info`/`extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model id, used for detail fetch and upsert.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Full workspace record when the model has one (`info.meta.toolIds`
    /// holds the tool assignments).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    /// Fields this tool does not model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ModelSummary {
    /// Current tool-id list of this model (empty when unset).
    #[must_use]
    pub fn tool_ids(&self) -> Vec<String> {
        self.info
            .as_ref()
            .and_then(|info| info.get("meta"))
            .and_then(|meta| meta.get("toolIds"))
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One OpenAI-compatible connection in record form.
///
/// The remote API represents these as three index-aligned lists (base
/// URLs, keys, per-index configs); adapters project between that wire form
/// and this record form at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConnection {
    /// Base URL of the endpoint.
    pub url: String,
    /// API key for the endpoint (may be empty).
    #[serde(default)]
    pub key: String,
    /// Per-connection config object.
    #[serde(default)]
    pub config: Value,
}

/// The remote OpenAI connection settings in record form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenAiSettings {
    /// Whether the OpenAI API integration is enabled at all.
    pub enabled: bool,
    /// Ordered connection records.
    pub connections: Vec<OpenAiConnection>,
}

/// Typed operations against the remote config endpoints.
///
/// Every call requires a bearer credential; implementations fail fast with
/// [`WebUiError::MissingToken`] when none is configured.
#[async_trait]
pub trait WebUiApi: Send + Sync {
    /// Fetch the full tool-server connection list as raw JSON values.
    async fn tool_server_connections(&self) -> Result<Vec<Value>, WebUiError>;

    /// Replace the full tool-server connection list in one call.
    async fn set_tool_server_connections(&self, connections: &[Value])
    -> Result<(), WebUiError>;

    /// Fetch model summaries.
    async fn list_models(&self) -> Result<Vec<ModelSummary>, WebUiError>;

    /// Fetch one model's full record.
    ///
    /// HTTP 404 *and* error bodies whose message resembles "not found" are
    /// `Ok(None)`, not failures — the remote sometimes lists a model before
    /// it is materialized as a record.
    async fn model_detail(&self, id: &str) -> Result<Option<Value>, WebUiError>;

    /// Create a model record.
    async fn create_model(&self, model: &Value) -> Result<(), WebUiError>;

    /// Update an existing model record.
    ///
    /// # Errors
    ///
    /// - `ModelNotFound` when the remote answers 404, so the caller can
    ///   fall back to create
    async fn update_model(&self, id: &str, model: &Value) -> Result<(), WebUiError>;

    /// Fetch the OpenAI connection settings (record form).
    async fn openai_config(&self) -> Result<OpenAiSettings, WebUiError>;

    /// Replace the OpenAI connection settings (record form).
    async fn set_openai_config(&self, settings: &OpenAiSettings) -> Result<(), WebUiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_summary_reads_tool_ids_from_info_meta() {
        let summary: ModelSummary = serde_json::from_value(json!({
            "id": "llama3",
            "name": "Llama 3",
            "info": {"meta": {"toolIds": ["server:time", "web_search"]}},
            "owned_by": "ollama"
        }))
        .unwrap();

        assert_eq!(summary.tool_ids(), vec!["server:time", "web_search"]);
        assert_eq!(summary.extra.get("owned_by"), Some(&json!("ollama")));
    }

    #[test]
    fn model_summary_without_info_has_no_tool_ids() {
        let summary: ModelSummary =
            serde_json::from_value(json!({"id": "llama3", "name": "Llama 3"})).unwrap();
        assert!(summary.tool_ids().is_empty());
    }

    #[test]
    fn connection_serializes_type_field() {
        let connection = ToolServerConnection {
            url: "http://mcpo:8000/time".to_string(),
            path: "openapi.json".to_string(),
            connection_type: "openapi".to_string(),
            auth_type: "none".to_string(),
            headers: serde_json::Map::new(),
            key: String::new(),
            config: ToolServerConfig::default(),
            spec_type: "url".to_string(),
            spec: String::new(),
            info: ToolServerInfo {
                id: "time".to_string(),
                name: "time".to_string(),
                description: String::new(),
            },
        };

        let value = serde_json::to_value(&connection).unwrap();
        assert_eq!(value["type"], json!("openapi"));
        assert_eq!(value["config"]["enable"], json!(true));
        assert_eq!(value["config"]["access_control"], Value::Null);
    }
}
