//! matchstream - streaming practitioner search client
//!
//! Consumes the matching API's event stream: an initial batch of
//! candidate matches, then per-match AI explanations as they are
//! generated, then a completion or error signal. Everything is merged
//! into one session state that observers read as snapshots.
//!
//! # Architecture
//!
//! - **core**: Client logic (presentation-agnostic)
//!   - config, error, types, xdg, credentials
//!   - stream (frame decoding, event routing, HTTP transport)
//!   - session (state reducer, single-writer session task)
//!   - explain (explanation text parsing)
//!   - services (unified service container)
//!
//! - **cli**: Command-line adapter (depends on core)
//!
//! # Key Features
//!
//! - Chunk-boundary safe frame decoding (lines and UTF-8 carried over)
//! - Tag-first event routing with a payload-shape fallback
//! - Cancellation that never surfaces as an error
//! - Stale frames from superseded streams are dropped
//! - Explanation parsing with a configurable header vocabulary

// Client logic (presentation-agnostic)
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{MatchStreamError, Result, TransportError};
pub use core::explain::{ExplanationParser, ParsedExplanation};
pub use core::services::Services;
pub use core::session::{QuerySession, SearchSession, SessionSnapshot, SessionStage};
pub use core::types::*;
