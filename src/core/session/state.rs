//! Query session state.
//!
//! [`QuerySession`] is a plain reducer: routed stream events and user
//! actions are applied to it one at a time by a single owner (see
//! [`super::machine`]). Observers only ever see cloned snapshots.
//!
//! Mutators return `true` when observable state changed, so the owner
//! knows whether to publish a new snapshot.

use crate::core::error::TransportError;
use crate::core::stream::StreamEvent;
use crate::core::types::{
    EnrichmentUpdate, ExplanationStatus, ItemFailure, LlmSearchTerms, MatchBatch, MatchItem,
    SearchQuery, StatusUpdate, StreamFailure, StreamSummary,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Coarse lifecycle stage of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStage {
    #[default]
    Idle,
    Searching,
    Enriching,
    Complete,
    Error,
}

impl SessionStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStage::Complete | SessionStage::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStage::Idle => "idle",
            SessionStage::Searching => "searching",
            SessionStage::Enriching => "enriching",
            SessionStage::Complete => "complete",
            SessionStage::Error => "error",
        }
    }

    /// Stage named by a `status` frame. Terminal stages are not accepted
    /// from status frames.
    pub fn from_status_stage(stage: &str) -> Option<Self> {
        match stage.trim().to_ascii_lowercase().as_str() {
            "search" | "searching" => Some(SessionStage::Searching),
            "explanations" | "enriching" => Some(SessionStage::Enriching),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionTimings {
    /// Server time to produce the initial batch
    pub search_time_ms: Option<u64>,
    /// Server time for the whole stream
    pub total_processing_time_ms: Option<u64>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SessionTimings {
    /// Round server-reported fractional milliseconds; negatives clamp to zero
    pub fn whole_ms(ms: f64) -> u64 {
        ms.max(0.0).round() as u64
    }

    /// Client-side wall time, once the session has finished
    pub fn elapsed_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuerySession {
    run_id: u64,
    query: Option<SearchQuery>,
    items: Vec<MatchItem>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    batch_received: bool,
    total_results: usize,
    completed: usize,
    total: usize,
    explanations_generated: usize,
    stage: SessionStage,
    status_message: String,
    timings: SessionTimings,
    error: Option<String>,
    retryable: bool,
    llm_search_terms: Option<LlmSearchTerms>,
    stream_active: bool,
}

impl QuerySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh session for a new search. Nothing from a previous run survives.
    pub fn begin(run_id: u64, query: SearchQuery) -> Self {
        Self {
            run_id,
            query: Some(query),
            stage: SessionStage::Searching,
            status_message: "Starting search...".to_string(),
            timings: SessionTimings {
                started_at: Some(Utc::now()),
                ..SessionTimings::default()
            },
            stream_active: true,
            ..Self::default()
        }
    }

    /// Apply one routed event. Events are ignored once the stream is
    /// no longer active.
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        if !self.stream_active {
            tracing::debug!("Ignoring {} event for inactive stream", event.kind());
            return false;
        }

        match event {
            StreamEvent::MatchBatch(batch) => self.on_match_batch(batch),
            StreamEvent::EnrichmentUpdate(update) => self.on_enrichment_update(update),
            StreamEvent::ItemError(failure) => self.on_item_error(failure),
            StreamEvent::StatusUpdate(update) => self.on_status_update(update),
            StreamEvent::StreamError(failure) => self.on_stream_error(failure),
            StreamEvent::StreamComplete(summary) => self.on_stream_complete(summary),
            StreamEvent::Unclassified { tag, reason } => {
                tracing::warn!(tag = ?tag, "Dropping unclassified frame: {}", reason);
                false
            }
        }
    }

    fn on_match_batch(&mut self, batch: MatchBatch) -> bool {
        if self.batch_received {
            tracing::warn!(
                "Ignoring repeated match batch ({} matches); items are fixed by the first",
                batch.matches.len()
            );
            return false;
        }
        self.batch_received = true;

        for mut item in batch.matches {
            if self.index.contains_key(&item.practitioner_id) {
                tracing::warn!("Duplicate practitioner '{}' in batch", item.practitioner_id);
                continue;
            }
            if batch.explanations_pending && item.explanation_status == ExplanationStatus::Pending
            {
                item.explanation_status = ExplanationStatus::Loading;
            }
            self.index
                .insert(item.practitioner_id.clone(), self.items.len());
            self.items.push(item);
        }

        let count = self.items.len();
        self.total_results = batch.total_results.max(count);
        self.total = count;
        self.completed = self
            .items
            .iter()
            .filter(|item| item.explanation_status == ExplanationStatus::Complete)
            .count();
        self.timings.search_time_ms = Some(SessionTimings::whole_ms(batch.processing_time_ms));
        self.llm_search_terms = batch.llm_search_terms;

        if batch.explanations_pending {
            self.stage = SessionStage::Enriching;
            self.status_message = format!("Found {count} matches. Generating explanations...");
        } else {
            self.stage = SessionStage::Complete;
            self.status_message = format!("Found {count} matches");
        }

        tracing::info!(
            matches = count,
            pending = batch.explanations_pending,
            "Match batch applied"
        );
        true
    }

    fn on_enrichment_update(&mut self, update: EnrichmentUpdate) -> bool {
        let Some(&idx) = self.index.get(&update.practitioner_id) else {
            tracing::debug!(
                "Ignoring explanation for unknown practitioner '{}'",
                update.practitioner_id
            );
            return false;
        };

        let item = &mut self.items[idx];
        if item.explanation_status == ExplanationStatus::Error {
            tracing::debug!(
                "Ignoring explanation for failed item '{}'",
                update.practitioner_id
            );
            return false;
        }
        item.explanation = update.explanation;
        if item.explanation_status.can_advance_to(ExplanationStatus::Complete) {
            item.explanation_status = ExplanationStatus::Complete;
        }

        self.completed = self.completed.max(update.completed.min(self.items.len()));
        self.status_message = format!("Generated {}/{} explanations", self.completed, self.total);
        true
    }

    fn on_item_error(&mut self, failure: ItemFailure) -> bool {
        let Some(id) = failure.practitioner_id else {
            tracing::warn!(
                "Explanation failed without a practitioner id: {}",
                failure.message
            );
            return false;
        };
        let Some(&idx) = self.index.get(&id) else {
            tracing::debug!("Ignoring explanation error for unknown practitioner '{}'", id);
            return false;
        };

        let item = &mut self.items[idx];
        if !item.explanation_status.can_advance_to(ExplanationStatus::Error) {
            return false;
        }
        tracing::warn!("Explanation failed for '{}': {}", id, failure.message);
        item.explanation_status = ExplanationStatus::Error;
        true
    }

    fn on_status_update(&mut self, update: StatusUpdate) -> bool {
        self.status_message = update.message;

        if let Some(stage) = update.stage.as_deref() {
            match SessionStage::from_status_stage(stage) {
                Some(next) if !self.stage.is_terminal() => self.stage = next,
                Some(_) => {}
                None => tracing::debug!("Ignoring status stage '{}'", stage),
            }
        }
        if let Some(total) = update.total {
            self.total = total.min(self.items.len());
        }
        true
    }

    fn on_stream_error(&mut self, failure: StreamFailure) -> bool {
        tracing::error!("Server reported stream error: {}", failure.message);
        self.fail(failure.message, true);
        true
    }

    fn on_stream_complete(&mut self, summary: StreamSummary) -> bool {
        self.stage = SessionStage::Complete;
        self.status_message = "Search complete".to_string();
        self.timings.total_processing_time_ms =
            Some(SessionTimings::whole_ms(summary.total_processing_time_ms));
        self.explanations_generated = summary.explanations_generated;
        self.finish();
        tracing::info!(
            total_ms = summary.total_processing_time_ms,
            explanations = summary.explanations_generated,
            "Stream complete"
        );
        true
    }

    /// Body ended. Ending before a terminal stage is a failure.
    pub fn on_closed(&mut self) -> bool {
        if !self.stream_active {
            return false;
        }
        if self.stage.is_terminal() {
            self.finish();
            return true;
        }
        self.on_transport_error(&TransportError::IncompleteStream)
    }

    pub fn on_transport_error(&mut self, error: &TransportError) -> bool {
        if !self.stream_active {
            return false;
        }
        self.fail(error.user_message(), error.is_retryable());
        true
    }

    /// Failure before a stream could be opened (credentials, request setup)
    pub fn on_setup_error(&mut self, message: String) -> bool {
        if !self.stream_active {
            return false;
        }
        self.fail(message, false);
        true
    }

    /// Stop tracking the stream. Items already merged are kept.
    pub fn cancel(&mut self) -> bool {
        if !self.stream_active {
            return false;
        }
        self.stage = SessionStage::Idle;
        self.status_message = "Search cancelled".to_string();
        self.finish();
        tracing::info!("Search cancelled with {} items merged", self.items.len());
        true
    }

    /// Replace an item's explanation text by hand
    pub fn update_explanation(&mut self, practitioner_id: &str, explanation: String) -> bool {
        let Some(&idx) = self.index.get(practitioner_id) else {
            return false;
        };
        let item = &mut self.items[idx];
        item.explanation = explanation;
        if item.explanation_status.can_advance_to(ExplanationStatus::Complete) {
            item.explanation_status = ExplanationStatus::Complete;
        }
        true
    }

    fn fail(&mut self, message: String, retryable: bool) {
        self.stage = SessionStage::Error;
        self.status_message = format!("Error: {message}");
        self.error = Some(message);
        self.retryable = retryable;
        self.finish();
    }

    fn finish(&mut self) {
        self.stream_active = false;
        self.timings.finished_at = Some(Utc::now());
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    /// Items in batch order
    pub fn items(&self) -> &[MatchItem] {
        &self.items
    }

    pub fn item(&self, practitioner_id: &str) -> Option<&MatchItem> {
        self.index.get(practitioner_id).map(|&idx| &self.items[idx])
    }

    pub fn total_results(&self) -> usize {
        self.total_results
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Enrichment progress, 0-100
    pub fn progress_percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100 / self.total).min(100)) as u8
    }

    pub fn explanations_generated(&self) -> usize {
        self.explanations_generated
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn timings(&self) -> &SessionTimings {
        &self.timings
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the error leaves room for a retry
    pub fn is_retryable(&self) -> bool {
        self.error.is_some() && self.retryable
    }

    pub fn llm_search_terms(&self) -> Option<&LlmSearchTerms> {
        self.llm_search_terms.as_ref()
    }

    pub fn is_stream_active(&self) -> bool {
        self.stream_active
    }
}
