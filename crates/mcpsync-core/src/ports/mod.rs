//! Port traits implemented by the adapter crates.

mod file_bridge;
mod restart;
mod webui;

pub use file_bridge::{FileBridge, FileBridgeError};
pub use restart::{NoopRestart, RestartError, RestartSignal};
pub use webui::{
    ModelSummary, OpenAiConnection, OpenAiSettings, ToolServerConfig, ToolServerConnection,
    ToolServerInfo, WebUiApi, WebUiError,
};
