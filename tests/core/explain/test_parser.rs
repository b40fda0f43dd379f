//! Explanation parsing through the public API

use crate::common::fixtures::LEGACY_EXPLANATION;
use crate::common::EXPLANATION;
use matchstream::core::config::Config;
use matchstream::core::explain::{
    parse, EvidenceSource, ExplanationParser, HeaderVocabulary, ParsedExplanation, Segmentation,
};
use matchstream::core::types::ScoreBand;

#[test]
fn test_documented_example() {
    let text = "Explicit LinkedIn Matches:\n- Led payments migration at Bank X\n\nLinkedIn Relevance Score: 8/10";
    let report = parse(text).report().cloned().expect("structured");
    assert_eq!(report.linkedin.explicit, vec!["Led payments migration at Bank X"]);
    assert_eq!(report.linkedin.score, 8);
}

#[test]
fn test_no_headers_falls_back_to_raw() {
    let text = "Strong background in legacy systems.\nWould be a good fit.";
    match parse(text) {
        ParsedExplanation::Unparsed(raw) => assert_eq!(raw, text),
        other => panic!("expected unparsed, got {other:?}"),
    }
}

#[test]
fn test_current_format() {
    let report = parse(EXPLANATION).report().cloned().unwrap();

    assert_eq!(report.segmentation, Segmentation::Marker);
    assert_eq!(
        report.bucket(EvidenceSource::LinkedIn).explicit,
        vec![
            "Led payments migration at Bank X",
            "COBOL developer at First National (2009-2015)"
        ]
    );
    // Template placeholder removed
    assert!(report.linkedin.inferred.is_empty());
    assert_eq!(report.linkedin.score, 8);

    // "No explicit ... found" boilerplate removed
    assert!(report.crosslake.explicit.is_empty());
    assert_eq!(
        report.crosslake.inferred,
        vec!["Mainframe assessment for a regional insurer"]
    );
    assert_eq!(report.crosslake.score, 5);
    assert_eq!(report.combined_score(), 7);
    assert_eq!(
        ScoreBand::for_evidence_score(report.linkedin.score),
        ScoreBand::Strong
    );
}

#[test]
fn test_legacy_format_without_markers() {
    let report = parse(LEGACY_EXPLANATION).report().cloned().unwrap();

    assert_eq!(report.segmentation, Segmentation::Capitalized);
    assert_eq!(report.linkedin.explicit, vec!["Led payments migration at Bank X"]);
    assert_eq!(report.linkedin.score, 7);
    assert_eq!(report.crosslake.explicit, vec!["Core banking due diligence"]);
    assert_eq!(report.crosslake.score, 4);
}

#[test]
fn test_parser_from_configured_vocabulary() {
    let config: Config = toml::from_str(
        r#"
        [explanation]
        placeholder_phrases = ["nothing notable"]

        [[explanation.header_rules]]
        all_of = ["career", "highlights"]
        source = "linkedin"
        kind = "explicit"
        "#,
    )
    .unwrap();

    let parser = ExplanationParser::new(HeaderVocabulary::extended(
        &config.explanation.header_rules,
        &config.explanation.placeholder_phrases,
    ));

    let text = "# Career Highlights:\n- Ran a COBOL to Java conversion\n- Nothing notable beyond that\n# LinkedIn Relevance Score: 9";
    let report = parser.parse(text).report().cloned().unwrap();
    assert_eq!(report.linkedin.explicit, vec!["Ran a COBOL to Java conversion"]);
    assert_eq!(report.linkedin.score, 9);
}

#[test]
fn test_unparsed_serializes_with_raw_text() {
    let value = serde_json::to_value(parse("plain words")).unwrap();
    assert_eq!(value["format"], "unparsed");
    assert_eq!(value["content"], "plain words");
}

#[test]
fn test_empty_sections_keep_raw_text() {
    // Known headers, but every line is template boilerplate and no score was given
    let text = "Explicit Crosslake Matches:\n- No explicit Crosslake matches found\nInferred Crosslake Matches:\n- [List Crosslake experience here]";
    match parse(text) {
        ParsedExplanation::Unparsed(raw) => assert_eq!(raw, text),
        other => panic!("expected unparsed, got {other:?}"),
    }
}
