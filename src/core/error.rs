//! Error types and error handling for the matchstream client.
//!
//! This module defines the error types used throughout the
//! client. Cancellation is deliberately absent: an aborted stream
//! is a normal outcome, not a failure.

use thiserror::Error;

/// Result type alias for matchstream operations
pub type Result<T> = std::result::Result<T, MatchStreamError>;

/// Main error type for the matchstream client
#[derive(Error, Debug)]
pub enum MatchStreamError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Credential error: {0}")]
    CredentialError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl MatchStreamError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        match self {
            MatchStreamError::Transport(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            MatchStreamError::InvalidQuery(_) | MatchStreamError::ConfigError(_)
        )
    }

    /// Check if retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            MatchStreamError::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Network-level failures of the stream transport.
///
/// These are never produced by a cooperative cancellation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("network changed during streaming: {0}")]
    NetworkChanged(String),

    #[error("stream stalled: no data for {idle_secs}s")]
    Stalled { idle_secs: u64 },

    #[error("stream closed before the search completed")]
    IncompleteStream,

    #[error("{0}")]
    Request(String),
}

impl TransportError {
    /// Message suitable for showing next to a retry affordance
    pub fn user_message(&self) -> String {
        match self {
            TransportError::ConnectionFailed(_) => {
                "Connection failed. Please check your network and try again.".to_string()
            }
            TransportError::NetworkChanged(_) => {
                "Network connection changed during streaming. Please try again.".to_string()
            }
            TransportError::Stalled { idle_secs } => {
                format!("The server stopped responding ({idle_secs}s without data). Please try again.")
            }
            TransportError::IncompleteStream => {
                "The connection closed before the search completed. Please try again.".to_string()
            }
            TransportError::Http { .. } | TransportError::Request(_) => self.to_string(),
        }
    }

    /// Client errors (4xx) will fail the same way again
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http { status, .. } => *status >= 500,
            _ => true,
        }
    }
}
