//! Docker adapter for mcpsync.
//!
//! The authoritative document lives inside a Docker volume the host cannot
//! touch directly. Every read and write goes through a short-lived helper
//! container mounted against the volume, and the volume itself is located
//! by resolving the deployed compose stack first.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod bridge;
pub mod helper;
pub mod restart;
pub mod stack;

pub use bridge::DockerFileBridge;
pub use helper::{DockerCliRunner, HelperError, HelperOutput, HelperRunner, ShellRunner};
pub use restart::ComposeRestartSignal;
pub use stack::{ComposeStackLocator, FixedStack, ResolvedStack, StackError, StackLocator};
