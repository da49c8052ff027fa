//! Subcommand definitions.

use clap::Subcommand;

/// All mcpsync subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the current server definitions (secrets masked by default)
    Show {
        /// Print sensitive environment values instead of placeholders
        #[arg(long)]
        reveal: bool,
    },

    /// Write an edited definitions document and reconcile
    Apply {
        /// Path to the edited JSON document
        file: String,
    },

    /// Run one reconciliation pass from the current document
    Sync,

    /// Ensure the local inference endpoint is registered in Open WebUI
    EnsureConnection,

    /// Manage the Open WebUI API token
    Token {
        #[command(subcommand)]
        command: TokenCommand,
    },
}

/// Credential management subcommands.
#[derive(Subcommand)]
pub enum TokenCommand {
    /// Store the API token
    Set {
        /// The bearer token value
        token: String,
    },
    /// Report whether a token is configured
    Status,
    /// Forget the stored token
    Clear,
}
