//! Sync settings and fixed identifiers.
//!
//! Pure domain configuration with no infrastructure dependencies. The
//! defaults match the shipped compose stack; every field can be overridden
//! by the composition root.

use serde::{Deserialize, Serialize};

/// Base URL at which every managed tool server is reachable, keyed by id.
pub const DEFAULT_PROXY_BASE_URL: &str = "http://mcpo:8000";

/// Default address of the Open WebUI instance being reconciled.
pub const DEFAULT_WEBUI_BASE_URL: &str = "http://localhost:8090";

/// OpenAI-compatible endpoint the connection ensurer keeps registered.
pub const DEFAULT_OPENAI_URL: &str = "http://host.docker.internal:11434/v1";

/// Prefix of every tool id this system manages on remote models.
///
/// Ids without this prefix are foreign and are never touched.
pub const TOOL_ID_PREFIX: &str = "server:";

/// Name of the authoritative document, relative to the stack's config
/// directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Settings for the reconciliation services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncSettings {
    /// Base URL of the MCP proxy; `<proxy_base_url>/<id>` is the derived
    /// URL of each managed server and doubles as the ownership marker on
    /// remote tool-server connections.
    pub proxy_base_url: String,

    /// Base URL of the Open WebUI instance.
    pub webui_base_url: String,

    /// Authoritative document path, relative to the resolved stack
    /// config directory.
    pub config_file: String,

    /// URL of the fixed OpenAI-compatible connection the ensurer maintains.
    pub openai_url: String,

    /// API key recorded alongside the ensured connection.
    pub openai_key: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SyncSettings {
    /// Create settings matching the shipped compose stack.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            proxy_base_url: DEFAULT_PROXY_BASE_URL.to_string(),
            webui_base_url: DEFAULT_WEBUI_BASE_URL.to_string(),
            config_file: CONFIG_FILE_NAME.to_string(),
            openai_url: DEFAULT_OPENAI_URL.to_string(),
            openai_key: String::new(),
        }
    }

    /// Proxy base URL without a trailing slash.
    #[must_use]
    pub fn proxy_base(&self) -> &str {
        self.proxy_base_url.trim_end_matches('/')
    }
}
