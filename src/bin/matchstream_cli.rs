//! matchstream CLI - streaming practitioner search from the terminal
//!
//! # Examples
//!
//! ```bash
//! # Stream a search
//! matchstream search "COBOL mainframe" --limit 5
//!
//! # Parse explanations into evidence
//! matchstream search "payments migration" --parse
//!
//! # Parse a saved explanation
//! matchstream explain explanation.txt
//!
//! # Show configuration
//! matchstream show-config
//! ```

use clap::Parser;
use matchstream::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "matchstream=debug"
    } else {
        "matchstream=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr) // stdout carries results
        .with_env_filter(filter);

    if std::env::var("MATCHSTREAM_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
