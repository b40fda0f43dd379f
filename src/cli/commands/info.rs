//! Info command - show version and client information

use crate::cli::output;
use crate::cli::OutputFormat;
use crate::core::credentials::token;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Also inspect the bearer token
    #[arg(long, short = 'd')]
    pub detailed: bool,
}

/// Client information response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
    pub protocol: String,
    pub endpoint: String,
    pub config_dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenInfo>,
}

#[derive(Debug, Serialize)]
pub struct TokenInfo {
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub expired: bool,
}

/// Execute the info command
pub async fn execute(
    args: InfoArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let xdg = crate::core::xdg::XdgDirs::new();
    let config_dir = xdg.config_dir.to_string_lossy().into_owned();

    let token = if args.detailed {
        let bearer = services.credentials.bearer_token().await?;
        Some(match bearer {
            Some(bearer) => TokenInfo {
                present: true,
                expires_at: token::expires_at(&bearer).map(|t| t.to_rfc3339()),
                expired: token::is_expired(&bearer),
            },
            None => TokenInfo {
                present: false,
                expires_at: None,
                expired: false,
            },
        })
    } else {
        None
    };

    let info = InfoResponse {
        name: "matchstream".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        protocol: "text/event-stream".to_string(),
        endpoint: services.config.server.stream_url(),
        config_dir,
        token,
    };

    match format {
        OutputFormat::Human => {
            output::print_header(&format!("matchstream {}", info.version));
            println!("Protocol: {}", info.protocol);
            println!("Endpoint: {}", info.endpoint);
            println!("Config: {}", info.config_dir);
            if let Some(token) = &info.token {
                if !token.present {
                    println!("Token: not set");
                } else {
                    let expiry = token.expires_at.as_deref().unwrap_or("unknown expiry");
                    let state = if token.expired { "expired" } else { "valid" };
                    println!("Token: {state} ({expiry})");
                }
            }
        }
        OutputFormat::Json => {
            output::print_json(&info)?;
        }
    }

    Ok(())
}
