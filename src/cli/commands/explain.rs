//! Explain command - parse explanation text into structured evidence

use crate::cli::output::{self, colors};
use crate::cli::OutputFormat;
use crate::core::explain::ParsedExplanation;
use crate::core::services::Services;
use clap::Args;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the explain command
#[derive(Args, Debug)]
pub struct ExplainArgs {
    /// File holding the explanation text (reads stdin when omitted)
    pub file: Option<PathBuf>,
}

/// Execute the explain command
pub async fn execute(
    args: ExplainArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let parsed = services.parser.parse(&text);

    match format {
        OutputFormat::Human => {
            if let ParsedExplanation::Unparsed(_) = parsed {
                println!(
                    "{}",
                    colors::dim("No recognizable sections; showing the text as-is")
                );
            }
            output::print_explanation(&parsed, 0);
        }
        OutputFormat::Json => {
            output::print_json(&parsed)?;
        }
    }

    Ok(())
}
