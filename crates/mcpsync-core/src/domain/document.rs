//! The authoritative configuration document.
//!
//! The document is a JSON object of the shape
//! `{ "mcpServers": { "<id>": { command, args, env, info } } }`. It is the
//! single source of truth: remote systems are reconciled *to* it, never
//! *from* it. Parsing is tolerant — malformed or non-object text normalizes
//! to the empty document instead of raising.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Human metadata attached to a server definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Display name; falls back to the server id when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One proxy-exposed tool server definition.
///
/// The launch spec (`command`, `args`, `env`) is opaque to the reconciler;
/// it is only surfaced for editing. Unknown fields round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerDefinition {
    /// Executable the proxy runs for this server.
    pub command: String,

    /// Arguments passed to the executable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Environment for the spawned process. `BTreeMap` keeps serialization
    /// order stable so repeated round trips do not churn the file.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,

    /// Optional human metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<ServerInfo>,

    /// Fields this tool does not model; preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServerDefinition {
    /// Create a definition from a command and its arguments.
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            ..Self::default()
        }
    }

    /// Add an environment variable.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Attach display metadata.
    #[must_use]
    pub fn with_info(mut self, name: Option<String>, description: Option<String>) -> Self {
        self.info = Some(ServerInfo { name, description });
        self
    }
}

/// The normalized authoritative document.
///
/// `mcp_servers` is always present after normalization, even if the raw
/// text omitted it or was unparseable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct McpConfig {
    /// Server definitions keyed by id.
    #[serde(rename = "mcpServers", default)]
    pub mcp_servers: BTreeMap<String, ServerDefinition>,
}

impl McpConfig {
    /// Tolerant parse: any parse failure or non-object input yields the
    /// empty document. This function never returns an error.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }

    /// Serialize to pretty-printed (2-space indent) JSON.
    ///
    /// `parse(serialize(parse(t)))` is structurally equal to `parse(t)` for
    /// any input `t`.
    #[must_use]
    pub fn serialize(&self) -> String {
        // BTreeMap ordering makes this deterministic; pretty printing
        // cannot fail for a map-rooted value.
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Whether the document declares no servers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mcp_servers.is_empty()
    }

    /// Extract the managed entities this document declares.
    ///
    /// Entries with an invalid id are skipped. `base_url` is the proxy
    /// base; the derived URL is `<base>/<id>` and is never stored.
    #[must_use]
    pub fn managed_servers(&self, base_url: &str) -> Vec<ManagedServer> {
        let base = base_url.trim_end_matches('/');
        self.mcp_servers
            .iter()
            .filter(|(id, _)| is_valid_server_id(id))
            .map(|(id, definition)| {
                let info = definition.info.as_ref();
                ManagedServer {
                    id: id.clone(),
                    name: info
                        .and_then(|i| i.name.clone())
                        .unwrap_or_else(|| id.clone()),
                    description: info.and_then(|i| i.description.clone()),
                    url: format!("{base}/{id}"),
                }
            })
            .collect()
    }
}

/// A server definition in its reconciler-facing form: stable id, display
/// metadata and the derived proxy URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedServer {
    /// Stable identifier; JSON map key and URL path segment.
    pub id: String,
    /// Display name (defaults to the id).
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Derived reachable URL: `<proxy-base>/<id>`.
    pub url: String,
}

/// Server ids are used as URL path segments and must match
/// `[A-Za-z0-9._-]+`.
#[must_use]
pub fn is_valid_server_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_is_tolerant() {
        assert!(McpConfig::parse("").is_empty());
        assert!(McpConfig::parse("not json").is_empty());
        assert!(McpConfig::parse("[1, 2, 3]").is_empty());
        assert!(McpConfig::parse("{}").is_empty());
        assert!(McpConfig::parse(r#"{"mcpServers": {}}"#).is_empty());
    }

    #[test]
    fn parse_serialize_round_trip_is_idempotent() {
        let text = r#"{"mcpServers":{"time":{"command":"docker","args":["run","mcp/time"]}}}"#;
        let once = McpConfig::parse(text);
        let twice = McpConfig::parse(&once.serialize());
        assert_eq!(once, twice);
        // Canonical form is stable under a second round trip
        assert_eq!(once.serialize(), twice.serialize());
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let text = r#"{"mcpServers":{"fs":{"command":"npx","disabled":true}}}"#;
        let doc = McpConfig::parse(text);
        let value: serde_json::Value = serde_json::from_str(&doc.serialize()).unwrap();
        assert_eq!(value["mcpServers"]["fs"]["disabled"], json!(true));
    }

    #[test]
    fn managed_servers_derive_url_and_default_name() {
        let doc = McpConfig::parse(
            r#"{"mcpServers":{
                "time":{"command":"docker","args":["run","mcp/time"]},
                "search":{"command":"npx","info":{"name":"Web Search","description":"ddg"}}
            }}"#,
        );

        let servers = doc.managed_servers("http://mcpo:8000/");
        assert_eq!(servers.len(), 2);

        let search = servers.iter().find(|s| s.id == "search").unwrap();
        assert_eq!(search.name, "Web Search");
        assert_eq!(search.description.as_deref(), Some("ddg"));
        assert_eq!(search.url, "http://mcpo:8000/search");

        let time = servers.iter().find(|s| s.id == "time").unwrap();
        assert_eq!(time.name, "time");
        assert_eq!(time.url, "http://mcpo:8000/time");
    }

    #[test]
    fn invalid_ids_are_skipped() {
        let doc = McpConfig::parse(
            r#"{"mcpServers":{
                "ok-id.v2":{"command":"a"},
                "has space":{"command":"b"},
                "slash/y":{"command":"c"}
            }}"#,
        );
        let servers = doc.managed_servers("http://mcpo:8000");
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].id, "ok-id.v2");
    }

    #[test]
    fn id_validation() {
        assert!(is_valid_server_id("time"));
        assert!(is_valid_server_id("a.b_c-d9"));
        assert!(!is_valid_server_id(""));
        assert!(!is_valid_server_id("a b"));
        assert!(!is_valid_server_id("a/b"));
    }
}
