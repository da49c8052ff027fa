//! Core domain types, ports and services for mcpsync.
//!
//! mcpsync keeps a local MCP proxy's server definitions (an `mcpServers`
//! JSON document living inside a Docker volume) in sync with an Open WebUI
//! instance: one tool-server connection per managed server, plus the
//! matching `server:<id>` tool assignment on every model.
//!
//! This crate holds the pure parts: the authoritative document model, the
//! sensitive-value mask, the port traits the adapters implement, and the
//! reconciliation services. No HTTP or Docker code lives here.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod credentials;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use credentials::{CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use domain::{
    ManagedServer, MaskError, MaskedDocument, McpConfig, SECRET_PLACEHOLDER, ServerDefinition,
    ServerInfo, mask_document, unmask_document,
};
pub use error::{SyncError, SyncResult};
pub use ports::{
    FileBridge, FileBridgeError, ModelSummary, NoopRestart, OpenAiConnection, OpenAiSettings,
    RestartError, RestartSignal, ToolServerConfig, ToolServerConnection, ToolServerInfo, WebUiApi,
    WebUiError,
};
pub use services::{ConnectionEnsurer, PassQueue, Reconciler, SyncReport};
pub use settings::{
    DEFAULT_OPENAI_URL, DEFAULT_PROXY_BASE_URL, DEFAULT_WEBUI_BASE_URL, SyncSettings,
    TOOL_ID_PREFIX,
};
