//! Open WebUI adapter for mcpsync.
//!
//! Implements the remote config API port against Open WebUI's real
//! endpoints. The three-parallel-array OpenAI connection wire format is
//! confined to this crate; everything above it works with record-form
//! connections.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod client;
mod wire;

pub use client::WebUiClient;
