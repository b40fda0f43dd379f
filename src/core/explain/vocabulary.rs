//! Section-header vocabulary for explanation parsing.
//!
//! The headers the backend writes into explanations have changed
//! between releases ("Relevant LinkedIn History" became "Explicit
//! LinkedIn Matches"), so they are matched by keyword rules rather
//! than exact strings. Rules are tried in order; the first one whose
//! keywords all appear in the lowercased header wins.

use serde::{Deserialize, Serialize};

/// Where a piece of evidence came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceSource {
    /// Public professional profile
    LinkedIn,
    /// Internal engagement history
    Crosslake,
}

impl EvidenceSource {
    pub fn label(self) -> &'static str {
        match self {
            EvidenceSource::LinkedIn => "LinkedIn",
            EvidenceSource::Crosslake => "Crosslake",
        }
    }
}

/// What a section holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Explicit,
    Inferred,
    Score,
}

/// Maps a section header to a source and kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRule {
    /// Every keyword must appear in the header
    #[serde(default)]
    pub all_of: Vec<String>,

    /// At least one keyword must appear (ignored when empty)
    #[serde(default)]
    pub any_of: Vec<String>,

    pub source: EvidenceSource,
    pub kind: SectionKind,
}

impl HeaderRule {
    pub fn new(all_of: &[&str], source: EvidenceSource, kind: SectionKind) -> Self {
        Self {
            all_of: all_of.iter().map(|s| s.to_string()).collect(),
            any_of: Vec::new(),
            source,
            kind,
        }
    }

    pub fn with_any_of(mut self, any_of: &[&str]) -> Self {
        self.any_of = any_of.iter().map(|s| s.to_string()).collect();
        self
    }

    /// `header` must already be lowercased
    pub fn matches(&self, header: &str) -> bool {
        let all = self
            .all_of
            .iter()
            .all(|kw| header.contains(kw.to_lowercase().as_str()));
        let any = self.any_of.is_empty()
            || self
                .any_of
                .iter()
                .any(|kw| header.contains(kw.to_lowercase().as_str()));
        all && any
    }
}

/// Ordered header rules plus the boilerplate phrases to discard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderVocabulary {
    rules: Vec<HeaderRule>,
    placeholder_phrases: Vec<String>,
}

impl HeaderVocabulary {
    pub fn new(rules: Vec<HeaderRule>, placeholder_phrases: Vec<String>) -> Self {
        Self {
            rules,
            placeholder_phrases: placeholder_phrases
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Built-in vocabulary extended with caller rules and phrases.
    ///
    /// Extra rules take precedence over the built-in ones.
    pub fn extended(extra_rules: &[HeaderRule], extra_phrases: &[String]) -> Self {
        let defaults = Self::default();
        let mut rules = extra_rules.to_vec();
        rules.extend(defaults.rules);
        let mut phrases = defaults.placeholder_phrases;
        phrases.extend(extra_phrases.iter().map(|p| p.to_lowercase()));
        Self {
            rules,
            placeholder_phrases: phrases,
        }
    }

    /// First rule matching the header, case-insensitively
    pub fn classify(&self, header: &str) -> Option<&HeaderRule> {
        let header = header.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&header))
    }

    /// Bracketed template instructions and "no matches" boilerplate
    pub fn is_placeholder(&self, line: &str) -> bool {
        if line.starts_with('[') {
            return true;
        }
        let lower = line.to_lowercase();
        self.placeholder_phrases
            .iter()
            .any(|phrase| lower.contains(phrase.as_str()))
    }

    pub fn rules(&self) -> &[HeaderRule] {
        &self.rules
    }
}

impl Default for HeaderVocabulary {
    fn default() -> Self {
        use EvidenceSource::{Crosslake, LinkedIn};
        use SectionKind::{Explicit, Inferred, Score};

        let rules = vec![
            HeaderRule::new(&["explicit", "linkedin"], LinkedIn, Explicit),
            HeaderRule::new(&["inferred", "linkedin"], LinkedIn, Inferred),
            // Older releases: "Relevant LinkedIn History"
            HeaderRule::new(&["relevant", "linkedin", "history"], LinkedIn, Explicit),
            HeaderRule::new(&["linkedin"], LinkedIn, Score).with_any_of(&["score", "relevance"]),
            HeaderRule::new(&["explicit", "crosslake"], Crosslake, Explicit),
            HeaderRule::new(&["inferred", "crosslake"], Crosslake, Inferred),
            HeaderRule::new(&["relevant", "crosslake", "history"], Crosslake, Explicit),
            HeaderRule::new(&["crosslake"], Crosslake, Score).with_any_of(&["score", "history"]),
        ];

        let placeholder_phrases = [
            "[list",
            "no explicit matches",
            "no inferred matches",
            "no explicit crosslake matches",
            "no matches found",
        ];

        Self::new(
            rules,
            placeholder_phrases.iter().map(|s| s.to_string()).collect(),
        )
    }
}
