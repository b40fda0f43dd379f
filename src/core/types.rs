//! Core data types for the matchstream client.
//!
//! This module defines the request body, the match items that make up
//! a session, and the payload shapes carried by each stream frame.
//! Payload structs are lenient: missing fields fall back to defaults
//! so that older server builds still deserialize.

use serde::{Deserialize, Deserializer, Serialize};

/// Request body for the streaming match endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search query
    pub query: String,

    /// Maximum number of matches to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Ask the server to generate per-match explanations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_explanations: Option<bool>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
            include_explanations: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_explanations(mut self, include: bool) -> Self {
        self.include_explanations = Some(include);
        self
    }
}

/// Enrichment state of a single match item.
///
/// Ordered: `Pending < Loading < {Complete, Error}`. The two terminal
/// states are never left once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ExplanationStatus {
    #[default]
    Pending,
    Loading,
    Complete,
    Error,
}

impl ExplanationStatus {
    fn rank(self) -> u8 {
        match self {
            ExplanationStatus::Pending => 0,
            ExplanationStatus::Loading => 1,
            ExplanationStatus::Complete | ExplanationStatus::Error => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ExplanationStatus::Complete | ExplanationStatus::Error)
    }

    /// Whether moving from `self` to `next` goes forward
    pub fn can_advance_to(self, next: ExplanationStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExplanationStatus::Pending => "pending",
            ExplanationStatus::Loading => "loading",
            ExplanationStatus::Complete => "complete",
            ExplanationStatus::Error => "error",
        }
    }
}

impl From<String> for ExplanationStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "loading" => ExplanationStatus::Loading,
            "complete" => ExplanationStatus::Complete,
            "error" => ExplanationStatus::Error,
            _ => ExplanationStatus::Pending,
        }
    }
}

/// One practitioner returned by the initial batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchItem {
    /// Practitioner identifier (unique within a session)
    pub practitioner_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub linkedin_url: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub about: String,

    /// Relevance score after boosting (0-100)
    #[serde(default, deserialize_with = "null_as_default")]
    pub match_score: f64,

    /// AI-generated explanation text (empty until enriched)
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,

    #[serde(default)]
    pub explanation_status: ExplanationStatus,

    #[serde(default, deserialize_with = "null_as_default")]
    pub matched_keywords: Vec<String>,

    /// Compound phrases that were matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrase_matches: Option<Vec<String>>,

    /// Individual words that were matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_matches: Option<Vec<String>>,

    /// Multiplier applied upstream to the raw relevance score
    #[serde(default = "default_boost_factor", deserialize_with = "boost_factor_or_default")]
    pub boost_factor: f64,
}

fn default_boost_factor() -> f64 {
    1.0
}

fn boost_factor_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_else(default_boost_factor))
}

/// Treat an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl MatchItem {
    /// Phrase-level vs word-level keyword evidence.
    ///
    /// Falls back to splitting `matched_keywords` when the server did
    /// not send the two lists separately.
    pub fn keyword_evidence(&self) -> KeywordEvidence {
        if self.phrase_matches.is_some() || self.word_matches.is_some() {
            return KeywordEvidence {
                phrases: self.phrase_matches.clone().unwrap_or_default(),
                words: self.word_matches.clone().unwrap_or_default(),
            };
        }

        let (phrases, words): (Vec<String>, Vec<String>) = self
            .matched_keywords
            .iter()
            .cloned()
            .partition(|kw| kw.trim().contains(' '));
        KeywordEvidence { phrases, words }
    }

    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::for_match_score(self.match_score)
    }
}

/// Keyword overlap between the query and a practitioner profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordEvidence {
    pub phrases: Vec<String>,
    pub words: Vec<String>,
}

/// Qualitative label for a numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    /// Band for an overall match score on a 0-100 scale
    pub fn for_match_score(score: f64) -> Self {
        let rounded = score.round();
        if rounded >= 80.0 {
            ScoreBand::Excellent
        } else if rounded >= 60.0 {
            ScoreBand::Good
        } else if rounded >= 40.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }

    /// Band for a per-source explanation score on a 0-10 scale
    pub fn for_evidence_score(score: u32) -> Self {
        if score >= 7 {
            ScoreBand::Strong
        } else if score >= 4 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent Match",
            ScoreBand::Good => "Good Match",
            ScoreBand::Fair => "Fair Match",
            ScoreBand::Strong => "Strong Match",
            ScoreBand::Moderate => "Moderate Match",
            ScoreBand::Weak => "Weak Match",
        }
    }
}

/// Query expansion produced by the server's language model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmSearchTerms {
    #[serde(default)]
    pub primary_concepts: Vec<String>,
    #[serde(default)]
    pub expanded_terms: Vec<String>,
    #[serde(default)]
    pub exact_matches: Vec<String>,
    #[serde(default)]
    pub domain_context: String,
    #[serde(default)]
    pub confidence_score: f64,
}

/// `match_results` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBatch {
    #[serde(default)]
    pub query: String,
    pub matches: Vec<MatchItem>,
    #[serde(default)]
    pub total_results: usize,
    /// Server-side search time; fractional milliseconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub processing_time_ms: f64,
    #[serde(default)]
    pub explanations_pending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_search_terms: Option<LlmSearchTerms>,
}

/// `explanation_complete` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentUpdate {
    pub practitioner_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_analysis: Option<serde_json::Value>,
    #[serde(default)]
    pub completed: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processing_time_ms: f64,
}

/// `status` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

/// `stream_complete` payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub total_processing_time_ms: f64,
    #[serde(default)]
    pub explanations_generated: usize,
}

/// `error` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamFailure {
    pub message: String,
}

/// `explanation_error` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFailure {
    #[serde(default)]
    pub practitioner_id: Option<String>,
    #[serde(default = "default_item_failure_message")]
    pub message: String,
}

fn default_item_failure_message() -> String {
    "Explanation generation failed".to_string()
}
