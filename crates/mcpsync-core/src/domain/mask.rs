//! Display-safe masking of sensitive environment values.
//!
//! Editing happens on a masked copy of the document: env values whose key
//! looks sensitive are replaced by [`SECRET_PLACEHOLDER`], and the
//! originals are parked in a session-scoped map keyed by
//! `"<serverId>::<envKey>"`. The map must be discarded whenever the
//! document is reloaded from the authoritative source — placeholders carry
//! no payload of their own.
//!
//! Masking never touches the reconciliation path, which always operates on
//! unmasked text.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;

/// Placeholder shown in place of a sensitive value.
pub const SECRET_PLACEHOLDER: &str = "********";

/// Case-insensitive substrings that mark an env key as sensitive.
const SENSITIVE_KEYWORDS: &[&str] = &[
    "key",
    "token",
    "secret",
    "password",
    "passwd",
    "auth",
    "credential",
];

/// Errors from the unmask direction.
///
/// Masking itself cannot fail: unparseable text simply has nothing to mask.
#[derive(Debug, Error)]
pub enum MaskError {
    /// The edited text is not a JSON object. Surfaced before any network
    /// call so a broken edit never reaches the bridge or the remote API.
    #[error("edited configuration is not a JSON object: {0}")]
    Format(String),
}

/// A masked rendition of the document plus the session secret map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedDocument {
    /// Display-safe document text.
    pub text: String,
    /// Original values keyed by `"<serverId>::<envKey>"`.
    pub secrets: BTreeMap<String, String>,
}

/// Whether an env key matches the sensitive-keyword heuristic.
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    SENSITIVE_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

/// Produce a display-safe transform of `text`.
///
/// Every string value under `mcpServers.*.env.*` whose key matches the
/// sensitive heuristic is recorded in the secret map and replaced by
/// [`SECRET_PLACEHOLDER`] in the returned text. When nothing matches the
/// input text is returned unchanged, avoiding re-serialization diff noise.
#[must_use]
pub fn mask_document(text: &str) -> MaskedDocument {
    let Ok(mut root) = serde_json::from_str::<Value>(text) else {
        return MaskedDocument {
            text: text.to_string(),
            secrets: BTreeMap::new(),
        };
    };

    let mut secrets = BTreeMap::new();
    if let Some(servers) = root.get_mut("mcpServers").and_then(Value::as_object_mut) {
        for (server_id, definition) in servers {
            let Some(env) = definition.get_mut("env").and_then(Value::as_object_mut) else {
                continue;
            };
            for (env_key, value) in env {
                if let Value::String(original) = value {
                    if is_sensitive_key(env_key) {
                        secrets.insert(
                            format!("{server_id}::{env_key}"),
                            std::mem::take(original),
                        );
                        *value = Value::String(SECRET_PLACEHOLDER.to_string());
                    }
                }
            }
        }
    }

    if secrets.is_empty() {
        return MaskedDocument {
            text: text.to_string(),
            secrets,
        };
    }

    MaskedDocument {
        text: serde_json::to_string_pretty(&root).unwrap_or_else(|_| text.to_string()),
        secrets,
    }
}

/// Invert [`mask_document`] on (possibly edited) masked text.
///
/// A value is restored only when it still equals the placeholder *and* its
/// path exists in `secrets` — an explicit user edit always wins over the
/// map. Fails with [`MaskError::Format`] when `text` is not a JSON object.
pub fn unmask_document(
    text: &str,
    secrets: &BTreeMap<String, String>,
) -> Result<String, MaskError> {
    let mut root: Value =
        serde_json::from_str(text).map_err(|e| MaskError::Format(e.to_string()))?;
    if !root.is_object() {
        return Err(MaskError::Format("top-level value must be an object".to_string()));
    }

    if let Some(servers) = root.get_mut("mcpServers").and_then(Value::as_object_mut) {
        for (server_id, definition) in servers {
            let Some(env) = definition.get_mut("env").and_then(Value::as_object_mut) else {
                continue;
            };
            for (env_key, value) in env {
                if value.as_str() == Some(SECRET_PLACEHOLDER) {
                    if let Some(original) = secrets.get(&format!("{server_id}::{env_key}")) {
                        *value = Value::String(original.clone());
                    }
                }
            }
        }
    }

    serde_json::to_string_pretty(&root).map_err(|e| MaskError::Format(e.to_string()))
}
