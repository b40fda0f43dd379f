//! Explanation text parsing
//!
//! - **vocabulary**: keyword rules mapping section headers to evidence buckets
//! - **parser**: block segmentation and evidence extraction

pub mod parser;
pub mod vocabulary;

pub use parser::{
    parse, EvidenceBucket, EvidenceReport, ExplanationParser, ParsedExplanation, Segmentation,
};
pub use vocabulary::{EvidenceSource, HeaderRule, HeaderVocabulary, SectionKind};
