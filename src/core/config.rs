//! Configuration management for the matchstream client.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{MatchStreamError, Result};
use crate::core::explain::HeaderRule;
use crate::core::types::SearchQuery;
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub explanation: ExplanationConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Base URL of the matching API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the streaming match endpoint
    #[serde(default = "default_stream_path")]
    pub stream_path: String,

    /// TCP/TLS connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_sec: u64,

    /// Abort the stream after this many seconds without data (0 = never)
    #[serde(default)]
    pub stall_timeout_sec: u64,
}

/// Search request configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Default number of matches to request
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Maximum matches per query
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Request AI explanations by default
    #[serde(default = "default_include_explanations")]
    pub include_explanations: bool,

    /// Maximum query string length
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,
}

/// Credential configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

/// Explanation parser configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ExplanationConfig {
    /// Extra section-header rules, tried before the built-in ones
    #[serde(default)]
    pub header_rules: Vec<HeaderRule>,

    /// Extra boilerplate phrases to discard from evidence lists
    #[serde(default)]
    pub placeholder_phrases: Vec<String>,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_stream_path() -> String {
    "/api/v1/match/stream".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    50
}

fn default_include_explanations() -> bool {
    true
}

fn default_max_query_length() -> usize {
    500
}

fn default_token_env() -> String {
    "MATCHSTREAM_TOKEN".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            stream_path: default_stream_path(),
            connect_timeout_sec: default_connect_timeout(),
            stall_timeout_sec: 0,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            include_explanations: default_include_explanations(),
            max_query_length: default_max_query_length(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
        }
    }
}

impl ServerConfig {
    /// Full URL of the streaming endpoint
    pub fn stream_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.stream_path.trim_start_matches('/')
        )
    }
}

impl SearchConfig {
    /// Validate a query and fill in configured defaults.
    ///
    /// The query text is trimmed and the limit clamped to `1..=max_limit`.
    pub fn prepare(&self, query: SearchQuery) -> Result<SearchQuery> {
        let text = query.query.trim();
        if text.is_empty() {
            return Err(MatchStreamError::InvalidQuery(
                "Query cannot be empty".to_string(),
            ));
        }

        let length = text.chars().count();
        if length > self.max_query_length {
            return Err(MatchStreamError::InvalidQuery(format!(
                "Query is {length} characters, maximum is {}",
                self.max_query_length
            )));
        }

        Ok(SearchQuery {
            query: text.to_string(),
            limit: Some(
                query
                    .limit
                    .unwrap_or(self.default_limit)
                    .clamp(1, self.max_limit),
            ),
            include_explanations: Some(
                query
                    .include_explanations
                    .unwrap_or(self.include_explanations),
            ),
        })
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            MatchStreamError::ConfigError(format!("Failed to read config file: {e}"))
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. MATCHSTREAM_CONFIG env var
    /// 2. XDG config file (~/.config/matchstream/config.toml)
    /// 3. Legacy ./matchstream.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("MATCHSTREAM_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("matchstream.toml").exists() {
                Self::from_file("matchstream.toml")?
            } else {
                Self::default()
            }
        };

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Server configuration
        if let Ok(url) = env::var("MATCHSTREAM_API_URL") {
            self.server.base_url = url;
        }
        if let Ok(path) = env::var("MATCHSTREAM_STREAM_PATH") {
            self.server.stream_path = path;
        }
        if let Ok(timeout) = env::var("MATCHSTREAM_CONNECT_TIMEOUT_SEC") {
            if let Ok(t) = timeout.parse() {
                self.server.connect_timeout_sec = t;
            }
        }
        if let Ok(timeout) = env::var("MATCHSTREAM_STALL_TIMEOUT_SEC") {
            if let Ok(t) = timeout.parse() {
                self.server.stall_timeout_sec = t;
            }
        }

        // Search configuration
        if let Ok(limit) = env::var("MATCHSTREAM_DEFAULT_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.search.default_limit = l;
            }
        }
        if let Ok(limit) = env::var("MATCHSTREAM_MAX_LIMIT") {
            if let Ok(l) = limit.parse() {
                self.search.max_limit = l;
            }
        }
        if let Ok(include) = env::var("MATCHSTREAM_INCLUDE_EXPLANATIONS") {
            if let Ok(i) = include.parse() {
                self.search.include_explanations = i;
            }
        }

        // Auth configuration
        if let Ok(name) = env::var("MATCHSTREAM_TOKEN_ENV") {
            self.auth.token_env = name;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let base = self.server.base_url.as_str();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(MatchStreamError::ConfigError(format!(
                "Base URL must start with http:// or https://, got '{base}'"
            )));
        }

        if self.server.connect_timeout_sec == 0 {
            return Err(MatchStreamError::ConfigError(
                "Connect timeout must be non-zero".to_string(),
            ));
        }

        if self.search.default_limit == 0 {
            return Err(MatchStreamError::ConfigError(
                "Default limit must be non-zero".to_string(),
            ));
        }

        if self.search.default_limit > self.search.max_limit {
            return Err(MatchStreamError::ConfigError(
                "Default limit cannot exceed max limit".to_string(),
            ));
        }

        if self.search.max_query_length == 0 {
            return Err(MatchStreamError::ConfigError(
                "Max query length must be non-zero".to_string(),
            ));
        }

        if self.auth.token_env.trim().is_empty() {
            return Err(MatchStreamError::ConfigError(
                "Token environment variable name cannot be empty".to_string(),
            ));
        }

        for rule in &self.explanation.header_rules {
            if rule.all_of.is_empty() && rule.any_of.is_empty() {
                return Err(MatchStreamError::ConfigError(
                    "Header rules need at least one keyword".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Log configuration (redacting sensitive values)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Stream URL: {}", self.server.stream_url());
        tracing::info!("  Connect timeout: {}s", self.server.connect_timeout_sec);
        if self.server.stall_timeout_sec > 0 {
            tracing::info!("  Stall timeout: {}s", self.server.stall_timeout_sec);
        } else {
            tracing::info!("  Stall timeout: disabled");
        }
        tracing::info!("  Default limit: {}", self.search.default_limit);
        tracing::info!("  Max limit: {}", self.search.max_limit);
        tracing::info!(
            "  Include explanations: {}",
            self.search.include_explanations
        );
        tracing::info!("  Token env: {}", self.auth.token_env);
        tracing::info!(
            "  Extra header rules: {}",
            self.explanation.header_rules.len()
        );
    }
}
