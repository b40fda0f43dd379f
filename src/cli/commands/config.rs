//! Config command - show current configuration

use crate::cli::output;
use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also list every explanation header rule in effect
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub config_file: String,
    pub server: ServerSection,
    pub search: SearchSection,
    pub auth: AuthSection,
    pub explanation: ExplanationSection,
}

#[derive(Debug, Serialize)]
pub struct ServerSection {
    pub base_url: String,
    pub stream_url: String,
    pub connect_timeout_sec: u64,
    pub stall_timeout_sec: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchSection {
    pub default_limit: usize,
    pub max_limit: usize,
    pub include_explanations: bool,
    pub max_query_length: usize,
}

#[derive(Debug, Serialize)]
pub struct AuthSection {
    pub token_env: String,
    pub token_present: bool,
}

#[derive(Debug, Serialize)]
pub struct ExplanationSection {
    pub extra_header_rules: usize,
    pub extra_placeholder_phrases: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<String>>,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;

    let xdg = crate::core::xdg::XdgDirs::new();
    let config_file = xdg.config_file().to_string_lossy().into_owned();

    let rules = args.all.then(|| {
        services
            .parser
            .vocabulary()
            .rules()
            .iter()
            .map(|rule| {
                let mut keywords = rule.all_of.join(" + ");
                if !rule.any_of.is_empty() {
                    keywords.push_str(&format!(" + ({})", rule.any_of.join(" | ")));
                }
                format!("{keywords} -> {} {:?}", rule.source.label(), rule.kind)
            })
            .collect()
    });

    let response = ConfigResponse {
        config_file,
        server: ServerSection {
            base_url: config.server.base_url.clone(),
            stream_url: config.server.stream_url(),
            connect_timeout_sec: config.server.connect_timeout_sec,
            stall_timeout_sec: config.server.stall_timeout_sec,
        },
        search: SearchSection {
            default_limit: config.search.default_limit,
            max_limit: config.search.max_limit,
            include_explanations: config.search.include_explanations,
            max_query_length: config.search.max_query_length,
        },
        auth: AuthSection {
            token_env: config.auth.token_env.clone(),
            token_present: std::env::var(&config.auth.token_env).is_ok_and(|v| !v.is_empty()),
        },
        explanation: ExplanationSection {
            extra_header_rules: config.explanation.header_rules.len(),
            extra_placeholder_phrases: config.explanation.placeholder_phrases.len(),
            rules,
        },
    };

    match format {
        OutputFormat::Human => {
            output::print_header("Configuration:");
            println!("  config_file: {}", response.config_file);
            println!("  server:");
            println!("    base_url: {}", response.server.base_url);
            println!("    stream_url: {}", response.server.stream_url);
            println!(
                "    connect_timeout_sec: {}",
                response.server.connect_timeout_sec
            );
            println!("    stall_timeout_sec: {}", response.server.stall_timeout_sec);
            println!("  search:");
            println!("    default_limit: {}", response.search.default_limit);
            println!("    max_limit: {}", response.search.max_limit);
            println!(
                "    include_explanations: {}",
                response.search.include_explanations
            );
            println!("    max_query_length: {}", response.search.max_query_length);
            println!("  auth:");
            println!("    token_env: {}", response.auth.token_env);
            println!("    token_present: {}", response.auth.token_present);
            println!("  explanation:");
            println!(
                "    extra_header_rules: {}",
                response.explanation.extra_header_rules
            );
            println!(
                "    extra_placeholder_phrases: {}",
                response.explanation.extra_placeholder_phrases
            );
            if let Some(rules) = &response.explanation.rules {
                println!("    rules:");
                for rule in rules {
                    println!("      {rule}");
                }
            }
        }
        OutputFormat::Json => {
            output::print_json(&response)?;
        }
    }

    Ok(())
}
