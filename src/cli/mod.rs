//! CLI adapter for matchstream
//!
//! Command-line front end for streaming practitioner searches and for
//! inspecting explanation text. Depends on `core/`; nothing in `core/`
//! depends on it.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |     core/        |
//! | (stream, session,|
//! |  explain)        |
//! +--------+---------+
//!          |
//!          v
//! +------------------+
//! |      cli/        |
//! | (clap adapter)   |
//! +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// matchstream - streaming practitioner search client
///
/// Runs a search against the matching API, shows matches as soon as
/// they arrive and fills in AI explanations as they are generated.
#[derive(Parser, Debug)]
#[command(name = "matchstream")]
#[command(version)]
#[command(about = "Streaming practitioner search client", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream a practitioner search (Ctrl-C cancels, keeping partial results)
    Search(commands::SearchArgs),

    /// Parse an explanation from a file or stdin
    Explain(commands::ExplainArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Show version and client information
    #[command(name = "get-client-info")]
    GetClientInfo(commands::InfoArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  matchstream completions bash > ~/.local/share/bash-completion/completions/matchstream
    ///   zsh:   matchstream completions zsh > ~/.zfunc/_matchstream
    ///   fish:  matchstream completions fish > ~/.config/fish/completions/matchstream.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Handle completions command early (doesn't need services)
    let command = match cli.command {
        Commands::Completions(args) => return commands::completions::execute(args),
        command => command,
    };

    let xdg = XdgDirs::new();
    xdg.log_paths();

    // Load configuration
    let config = Config::load_with_xdg(&xdg)?;
    config.log_config();

    // Create services
    let services = Arc::new(Services::new(config)?);

    // Execute command
    match command {
        Commands::Search(args) => commands::search::execute(args, &services, cli.format).await,
        Commands::Explain(args) => commands::explain::execute(args, &services, cli.format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::GetClientInfo(args) => commands::info::execute(args, &services, cli.format).await,
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
