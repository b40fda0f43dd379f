//! Core domain logic (presentation-agnostic)
//!
//! This module contains all client logic that is independent of
//! how results are shown.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Request, match item and payload structures
//! - **xdg**: XDG directory handling
//! - **credentials**: Bearer token providers and JWT expiry checks
//! - **stream**: Frame decoding, event routing, HTTP transport
//! - **session**: Query session reducer and its single-writer task
//! - **explain**: Explanation text parsing
//! - **services**: Unified service container

pub mod config;
pub mod credentials;
pub mod error;
pub mod explain;
pub mod services;
pub mod session;
pub mod stream;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{MatchStreamError, Result, TransportError};
pub use services::Services;
