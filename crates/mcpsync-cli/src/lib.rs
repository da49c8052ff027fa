//! CLI surface for mcpsync.
//!
//! The binary in `main.rs` is the composition root; everything else in
//! this crate is parsing, wiring and thin command handlers that delegate
//! to the core services.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs only
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;

pub use bootstrap::{SyncContext, bootstrap};
pub use commands::{Commands, TokenCommand};
pub use parser::Cli;
