//! Routing of wire frames, including legacy untagged payloads

use crate::common::cobol_batch;
use matchstream::core::stream::{route, FrameDecoder, RawFrame, StreamEvent};
use matchstream::core::types::ExplanationStatus;

#[test]
fn test_batch_frame_fields() {
    let frames = FrameDecoder::new().feed(cobol_batch().as_bytes());
    let StreamEvent::MatchBatch(batch) = route(&frames[0]) else {
        panic!("expected a match batch");
    };

    assert_eq!(batch.query, "COBOL mainframe");
    assert_eq!(batch.matches.len(), 3);
    assert_eq!(batch.processing_time_ms, 180.0);
    assert!(batch.explanations_pending);

    let first = &batch.matches[0];
    assert_eq!(first.practitioner_id, "p1");
    assert_eq!(first.explanation_status, ExplanationStatus::Pending);
    assert_eq!(first.boost_factor, 1.2);
    assert!(first.email.is_empty());

    let terms = batch.llm_search_terms.expect("search terms");
    assert_eq!(terms.expanded_terms, vec!["z/OS", "CICS", "JCL"]);
}

#[test]
fn test_legacy_untagged_frames() {
    let cases = [
        (r#"{"matches":[{"practitioner_id":"p1"}]}"#, "match_batch"),
        (
            r#"{"practitioner_id":"p1","explanation":"text","completed":1,"total":1}"#,
            "enrichment_update",
        ),
        (r#"{"message":"Generating","stage":"explanations"}"#, "status_update"),
        (r#"{"total_processing_time_ms":10}"#, "stream_complete"),
        (r#"{"message":"boom"}"#, "stream_error"),
        (r#"{"unexpected":true}"#, "unclassified"),
        (r#"not json at all"#, "unclassified"),
    ];

    for (data, expected) in cases {
        let event = route(&RawFrame::new(None, data));
        assert_eq!(event.kind(), expected, "payload {data}");
    }
}

#[test]
fn test_item_error_frame() {
    let event = route(&RawFrame::new(
        Some("explanation_error"),
        r#"{"practitioner_id":"p3","message":"model timeout"}"#,
    ));
    match event {
        StreamEvent::ItemError(failure) => {
            assert_eq!(failure.practitioner_id.as_deref(), Some("p3"));
            assert_eq!(failure.message, "model timeout");
        }
        other => panic!("expected item error, got {other:?}"),
    }
}

#[test]
fn test_terminal_events() {
    let done = route(&RawFrame::new(
        Some("stream_complete"),
        r#"{"total_processing_time_ms":1,"explanations_generated":0}"#,
    ));
    let error = route(&RawFrame::new(Some("error"), r#"{"message":"x"}"#));
    let status = route(&RawFrame::new(Some("status"), r#"{"message":"x"}"#));

    assert!(done.is_terminal());
    assert!(error.is_terminal());
    assert!(!status.is_terminal());
}

#[test]
fn test_fractional_timings_are_accepted() {
    let batch = route(&RawFrame::new(
        Some("match_results"),
        r#"{"query":"cobol","matches":[{"practitioner_id":"p1","match_score":null,"boost_factor":null}],"total_results":1,"processing_time_ms":123.45,"explanations_pending":true}"#,
    ));
    let StreamEvent::MatchBatch(batch) = batch else {
        panic!("expected a match batch, got {batch:?}");
    };
    assert_eq!(batch.processing_time_ms, 123.45);
    assert_eq!(batch.matches[0].match_score, 0.0);
    assert_eq!(batch.matches[0].boost_factor, 1.0);

    let update = route(&RawFrame::new(
        Some("explanation_complete"),
        r#"{"practitioner_id":"p1","explanation":null,"completed":1,"total":1,"processing_time_ms":812.3}"#,
    ));
    let StreamEvent::EnrichmentUpdate(update) = update else {
        panic!("expected an enrichment update, got {update:?}");
    };
    assert!(update.explanation.is_empty());
    assert_eq!(update.processing_time_ms, 812.3);

    let done = route(&RawFrame::new(
        Some("stream_complete"),
        r#"{"total_processing_time_ms":4200.7,"explanations_generated":1}"#,
    ));
    assert_eq!(done.kind(), "stream_complete");

    // Untagged legacy frames take the same path
    let untagged = route(&RawFrame::new(None, r#"{"total_processing_time_ms":4200.7}"#));
    assert_eq!(untagged.kind(), "stream_complete");
}
