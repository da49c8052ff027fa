//! OpenAI connection wire format.
//!
//! The remote stores OpenAI connections as three index-aligned lists:
//! base URLs, keys, and a config map keyed by stringified index. The lists
//! are allowed to drift in length (older deployments), so the projection
//! pads missing keys with empty strings and drops keys beyond the URL
//! list. Everything outside this module works with record-form
//! connections.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use mcpsync_core::ports::{OpenAiConnection, OpenAiSettings};

/// Wire shape of `GET /openai/config` and `POST /openai/config/update`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiWireConfig {
    #[serde(rename = "ENABLE_OPENAI_API", default)]
    pub enable: bool,
    #[serde(rename = "OPENAI_API_BASE_URLS", default)]
    pub base_urls: Vec<String>,
    #[serde(rename = "OPENAI_API_KEYS", default)]
    pub keys: Vec<String>,
    #[serde(rename = "OPENAI_API_CONFIGS", default)]
    pub configs: Map<String, Value>,
}

/// Project the three arrays into record form. The URL list is
/// authoritative for length.
pub fn to_settings(wire: &OpenAiWireConfig) -> OpenAiSettings {
    let connections = wire
        .base_urls
        .iter()
        .enumerate()
        .map(|(index, url)| OpenAiConnection {
            url: url.clone(),
            key: wire.keys.get(index).cloned().unwrap_or_default(),
            config: wire
                .configs
                .get(&index.to_string())
                .cloned()
                .unwrap_or_else(|| json!({})),
        })
        .collect();

    OpenAiSettings {
        enabled: wire.enable,
        connections,
    }
}

/// Project record-form settings back into the three arrays.
pub fn to_wire(settings: &OpenAiSettings) -> OpenAiWireConfig {
    let mut wire = OpenAiWireConfig {
        enable: settings.enabled,
        ..OpenAiWireConfig::default()
    };
    for (index, connection) in settings.connections.iter().enumerate() {
        wire.base_urls.push(connection.url.clone());
        wire.keys.push(connection.key.clone());
        wire.configs
            .insert(index.to_string(), connection.config.clone());
    }
    wire
}
