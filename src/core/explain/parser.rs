//! Explanation text parsing.
//!
//! Turns the semi-structured explanation block generated for a match
//! into categorized evidence:
//!
//! ```text
//! # Explicit LinkedIn Matches:
//! - Led payments migration at Bank X
//! # Inferred LinkedIn Matches:
//! - Mainframe exposure implied by 10y at IBM
//! # LinkedIn Relevance Score: 8/10
//! ```
//!
//! Text that cannot be mapped onto the vocabulary comes back as
//! [`ParsedExplanation::Unparsed`] and must be shown verbatim.

use super::vocabulary::{EvidenceSource, HeaderVocabulary, SectionKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-•*]\s*").unwrap());

static INTEGER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\b").unwrap());

/// Marker that starts a new section in the primary layout
const SECTION_MARKER: char = '#';

/// Evidence collected for one source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvidenceBucket {
    /// Verbatim overlap with the query
    pub explicit: Vec<String>,
    /// Relevance suggested without verbatim overlap
    pub inferred: Vec<String>,
    /// Sub-score (0 when the explanation gave none)
    pub score: u32,
}

impl EvidenceBucket {
    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty() && self.inferred.is_empty()
    }
}

/// How the sections were found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segmentation {
    /// Sections introduced by `#` lines
    Marker,
    /// Sections introduced by capitalized lines
    Capitalized,
}

/// Structured evidence extracted from an explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceReport {
    pub linkedin: EvidenceBucket,
    pub crosslake: EvidenceBucket,
    pub segmentation: Segmentation,
}

impl EvidenceReport {
    fn new(segmentation: Segmentation) -> Self {
        Self {
            linkedin: EvidenceBucket::default(),
            crosslake: EvidenceBucket::default(),
            segmentation,
        }
    }

    pub fn bucket(&self, source: EvidenceSource) -> &EvidenceBucket {
        match source {
            EvidenceSource::LinkedIn => &self.linkedin,
            EvidenceSource::Crosslake => &self.crosslake,
        }
    }

    fn bucket_mut(&mut self, source: EvidenceSource) -> &mut EvidenceBucket {
        match source {
            EvidenceSource::LinkedIn => &mut self.linkedin,
            EvidenceSource::Crosslake => &mut self.crosslake,
        }
    }

    /// Rounded mean of the two source scores
    pub fn combined_score(&self) -> u32 {
        let sum = self.linkedin.score + self.crosslake.score;
        (sum + 1) / 2
    }
}

/// Result of parsing an explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", content = "content", rename_all = "snake_case")]
pub enum ParsedExplanation {
    Structured(EvidenceReport),
    /// No recognizable structure; render the text as-is
    Unparsed(String),
}

impl ParsedExplanation {
    pub fn is_structured(&self) -> bool {
        matches!(self, ParsedExplanation::Structured(_))
    }

    pub fn report(&self) -> Option<&EvidenceReport> {
        match self {
            ParsedExplanation::Structured(report) => Some(report),
            ParsedExplanation::Unparsed(_) => None,
        }
    }
}

/// Parse with the built-in header vocabulary
pub fn parse(raw: &str) -> ParsedExplanation {
    ExplanationParser::default().parse(raw)
}

/// Explanation parser bound to a header vocabulary
#[derive(Debug, Clone, Default)]
pub struct ExplanationParser {
    vocabulary: HeaderVocabulary,
}

impl ExplanationParser {
    pub fn new(vocabulary: HeaderVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &HeaderVocabulary {
        &self.vocabulary
    }

    pub fn parse(&self, raw: &str) -> ParsedExplanation {
        if raw.trim().is_empty() {
            return ParsedExplanation::Unparsed(raw.to_string());
        }

        let has_markers = raw
            .lines()
            .any(|line| line.trim_start().starts_with(SECTION_MARKER));

        if has_markers {
            if let Some(report) = self.extract(&split_on_markers(raw), Segmentation::Marker) {
                return ParsedExplanation::Structured(report);
            }
        }

        tracing::debug!("No usable marker sections, trying capitalized-line segmentation");
        if let Some(report) = self.extract(&split_on_capitalized(raw), Segmentation::Capitalized) {
            return ParsedExplanation::Structured(report);
        }

        tracing::debug!("Explanation has no recognizable sections, keeping raw text");
        ParsedExplanation::Unparsed(raw.to_string())
    }

    /// Apply the vocabulary to each block.
    ///
    /// `None` unless some section yielded an item or a score: recognized
    /// headers holding only placeholders do not count as structure.
    fn extract(&self, blocks: &[Vec<&str>], segmentation: Segmentation) -> Option<EvidenceReport> {
        let mut report = EvidenceReport::new(segmentation);
        let mut scored = [false; 2];

        for block in blocks {
            let Some(header) = block.first() else {
                continue;
            };
            let Some(rule) = self.vocabulary.classify(header) else {
                continue;
            };

            match rule.kind {
                SectionKind::Explicit | SectionKind::Inferred => {
                    let items = self.bullet_items(&block[1..]);
                    let bucket = report.bucket_mut(rule.source);
                    if rule.kind == SectionKind::Explicit {
                        bucket.explicit.extend(items);
                    } else {
                        bucket.inferred.extend(items);
                    }
                }
                SectionKind::Score => {
                    let slot = match rule.source {
                        EvidenceSource::LinkedIn => 0,
                        EvidenceSource::Crosslake => 1,
                    };
                    if scored[slot] {
                        continue;
                    }
                    if let Some(score) = first_integer(block) {
                        report.bucket_mut(rule.source).score = score;
                        scored[slot] = true;
                    }
                }
            }
        }

        let usable = scored.iter().any(|&s| s)
            || !report.linkedin.is_empty()
            || !report.crosslake.is_empty();
        usable.then_some(report)
    }

    fn bullet_items(&self, lines: &[&str]) -> Vec<String> {
        lines
            .iter()
            .filter(|line| BULLET_PREFIX.is_match(line))
            .map(|line| BULLET_PREFIX.replace(line, "").trim().to_string())
            .filter(|item| !item.is_empty() && !self.vocabulary.is_placeholder(item))
            .collect()
    }
}

/// Trimmed, non-empty lines of a block
fn block_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn split_on_markers(raw: &str) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in block_lines(raw) {
        if let Some(rest) = line.strip_prefix(SECTION_MARKER) {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            let header = rest.trim_start_matches(SECTION_MARKER).trim();
            if !header.is_empty() {
                current.push(header);
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn split_on_capitalized(raw: &str) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in block_lines(raw) {
        let line = line.trim_start_matches(SECTION_MARKER).trim();
        let starts_upper = line.chars().next().is_some_and(char::is_uppercase);
        if starts_upper && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        if !line.is_empty() {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn first_integer(block: &[&str]) -> Option<u32> {
    block.iter().find_map(|line| {
        INTEGER_TOKEN
            .captures(line)
            .and_then(|cap| cap[1].parse::<u32>().ok())
    })
}
