//! CLI entry point.
//!
//! Parses arguments, initializes tracing, composes the context via
//! bootstrap and dispatches to the handlers.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mcpsync_cli::{Cli, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = bootstrap(&cli)?;
    match &cli.command {
        Commands::Show { reveal } => handlers::handle_show(&ctx, *reveal).await,
        Commands::Apply { file } => handlers::handle_apply(&ctx, file).await,
        Commands::Sync => handlers::handle_sync(&ctx).await,
        Commands::EnsureConnection => handlers::handle_ensure_connection(&ctx).await,
        Commands::Token { command } => handlers::handle_token(&ctx, command).await,
    }
}
