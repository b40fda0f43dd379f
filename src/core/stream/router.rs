//! Frame classification.
//!
//! Frames are classified by their `event:` tag first. Frames with no
//! tag, an unknown tag, or a payload that does not fit the tagged shape
//! go through a structural check of the payload instead. Anything left
//! over becomes [`StreamEvent::Unclassified`] and is dropped by the
//! session with a warning.

use super::decoder::RawFrame;
use crate::core::types::{
    EnrichmentUpdate, ItemFailure, MatchBatch, StatusUpdate, StreamFailure, StreamSummary,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Event tags sent by the server
pub mod tags {
    pub const MATCH_RESULTS: &str = "match_results";
    pub const EXPLANATION_COMPLETE: &str = "explanation_complete";
    pub const STATUS: &str = "status";
    pub const STREAM_COMPLETE: &str = "stream_complete";
    pub const ERROR: &str = "error";
    pub const EXPLANATION_ERROR: &str = "explanation_error";
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    MatchBatch(MatchBatch),
    EnrichmentUpdate(EnrichmentUpdate),
    /// Enrichment failed for a single item
    ItemError(ItemFailure),
    StatusUpdate(StatusUpdate),
    StreamError(StreamFailure),
    StreamComplete(StreamSummary),
    Unclassified {
        tag: Option<String>,
        reason: String,
    },
}

impl StreamEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::MatchBatch(_) => "match_batch",
            StreamEvent::EnrichmentUpdate(_) => "enrichment_update",
            StreamEvent::ItemError(_) => "item_error",
            StreamEvent::StatusUpdate(_) => "status_update",
            StreamEvent::StreamError(_) => "stream_error",
            StreamEvent::StreamComplete(_) => "stream_complete",
            StreamEvent::Unclassified { .. } => "unclassified",
        }
    }

    /// `stream_complete` or `error`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::StreamError(_) | StreamEvent::StreamComplete(_)
        )
    }
}

/// Parse a frame's JSON and classify it
pub fn route(frame: &RawFrame) -> StreamEvent {
    match serde_json::from_str::<Value>(&frame.data) {
        Ok(payload) => classify(frame.event.as_deref(), &payload),
        Err(e) => StreamEvent::Unclassified {
            tag: frame.event.clone(),
            reason: format!("malformed JSON: {e}"),
        },
    }
}

/// Classify by tag, then by payload shape
pub fn classify(tag: Option<&str>, payload: &Value) -> StreamEvent {
    if let Some(tag) = tag {
        if let Some(event) = classify_tagged(tag, payload) {
            return event;
        }
    }

    classify_structural(payload).unwrap_or_else(|| StreamEvent::Unclassified {
        tag: tag.map(str::to_string),
        reason: "payload matches no known event shape".to_string(),
    })
}

/// Tag dispatch; `None` for unknown tags or mismatched payloads
pub fn classify_tagged(tag: &str, payload: &Value) -> Option<StreamEvent> {
    let event = match tag {
        tags::MATCH_RESULTS => StreamEvent::MatchBatch(decode(payload)?),
        tags::EXPLANATION_COMPLETE => StreamEvent::EnrichmentUpdate(decode(payload)?),
        tags::STATUS => StreamEvent::StatusUpdate(decode(payload)?),
        tags::STREAM_COMPLETE => StreamEvent::StreamComplete(decode(payload)?),
        tags::ERROR => StreamEvent::StreamError(decode(payload)?),
        tags::EXPLANATION_ERROR => StreamEvent::ItemError(decode(payload)?),
        other => {
            tracing::debug!("Unknown event tag '{}', checking payload shape", other);
            return None;
        }
    };
    Some(event)
}

/// Shape heuristic for untagged frames, checked in a fixed order
pub fn classify_structural(payload: &Value) -> Option<StreamEvent> {
    let obj = payload.as_object()?;

    if obj.get("matches").is_some_and(Value::is_array) {
        return decode(payload).map(StreamEvent::MatchBatch);
    }
    if obj.contains_key("practitioner_id") && obj.contains_key("explanation") {
        return decode(payload).map(StreamEvent::EnrichmentUpdate);
    }
    if obj.contains_key("message") && obj.contains_key("stage") {
        return decode(payload).map(StreamEvent::StatusUpdate);
    }
    if obj.contains_key("total_processing_time_ms") {
        return decode(payload).map(StreamEvent::StreamComplete);
    }
    if obj.get("message").is_some_and(Value::is_string) {
        return decode(payload).map(StreamEvent::StreamError);
    }
    None
}

fn decode<T: DeserializeOwned>(payload: &Value) -> Option<T> {
    match T::deserialize(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Payload does not fit expected shape: {}", e);
            None
        }
    }
}
