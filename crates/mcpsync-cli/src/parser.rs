//! Top-level argument parser.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the MCP proxy / Open WebUI sync tool.
#[derive(Parser)]
#[command(name = "mcpsync")]
#[command(about = "Keep MCP tool-server definitions in sync with Open WebUI")]
#[command(version)]
pub struct Cli {
    /// Open WebUI base URL
    #[arg(long = "webui-url", env = "MCPSYNC_WEBUI_URL", global = true)]
    pub webui_url: Option<String>,

    /// MCP proxy base URL (ownership marker for managed connections)
    #[arg(long = "proxy-url", env = "MCPSYNC_PROXY_URL", global = true)]
    pub proxy_url: Option<String>,

    /// Operate on a local directory instead of resolving the compose stack
    #[arg(long = "stack-dir", env = "MCPSYNC_STACK_DIR", global = true)]
    pub stack_dir: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_args_parse() {
        let cli = Cli::parse_from([
            "mcpsync",
            "--verbose",
            "--webui-url",
            "http://localhost:3000",
            "sync",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.webui_url.as_deref(), Some("http://localhost:3000"));
        assert!(matches!(cli.command, Commands::Sync));
    }

    #[test]
    fn show_accepts_reveal_flag() {
        let cli = Cli::parse_from(["mcpsync", "show", "--reveal"]);
        assert!(matches!(cli.command, Commands::Show { reveal: true }));
    }
}
