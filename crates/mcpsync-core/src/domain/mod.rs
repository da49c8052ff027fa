//! Domain types for the authoritative MCP configuration document.

mod document;
mod mask;

pub use document::{ManagedServer, McpConfig, ServerDefinition, ServerInfo, is_valid_server_id};
pub use mask::{
    MaskError, MaskedDocument, SECRET_PLACEHOLDER, is_sensitive_key, mask_document,
    unmask_document,
};
