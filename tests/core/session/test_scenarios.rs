//! End-to-end session scenarios over a scripted transport

use crate::common::{cobol_batch, explanation_frame, scripted_session, settle, wait_until};
use matchstream::core::session::SessionStage;
use matchstream::core::stream::TransportEvent;
use matchstream::core::types::{ExplanationStatus, SearchQuery};

#[tokio::test]
async fn test_cobol_mainframe_scenario() {
    let (session, transport) = scripted_session();
    let run = session.start(SearchQuery::new("COBOL mainframe")).unwrap();
    transport.wait_for_open(1).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.run_id(), run);
    assert_eq!(snapshot.stage(), SessionStage::Searching);
    assert_eq!(snapshot.status_message(), "Starting search...");

    transport.emit_sse(0, &cobol_batch());
    let snapshot = wait_until(&session, |s| s.items().len() == 3).await;
    assert_eq!(snapshot.stage(), SessionStage::Enriching);
    assert_eq!(
        snapshot.status_message(),
        "Found 3 matches. Generating explanations..."
    );
    assert!(snapshot.llm_search_terms().is_some());

    transport.emit_sse(0, &explanation_frame("p1", 1, 3));
    transport.emit_sse(0, &explanation_frame("p2", 2, 3));
    let snapshot = wait_until(&session, |s| s.completed() == 2).await;
    assert_eq!(snapshot.progress_percent(), 66);
    assert_eq!(snapshot.status_message(), "Generated 2/3 explanations");
    assert_eq!(
        snapshot.item("p3").unwrap().explanation_status,
        ExplanationStatus::Loading
    );

    transport.emit_sse(0, &explanation_frame("p3", 3, 3));
    transport.emit_frame(
        0,
        "stream_complete",
        r#"{"total_processing_time_ms":4199.8,"explanations_generated":3}"#,
    );

    let snapshot = session.settled(run).await;
    assert_eq!(snapshot.stage(), SessionStage::Complete);
    assert_eq!(snapshot.status_message(), "Search complete");
    assert_eq!(snapshot.progress_percent(), 100);
    assert_eq!(snapshot.timings().total_processing_time_ms, Some(4200));
    assert!(snapshot
        .items()
        .iter()
        .all(|i| i.explanation_status == ExplanationStatus::Complete));
}

#[tokio::test]
async fn test_item_key_set_fixed_by_first_batch() {
    let (session, transport) = scripted_session();
    session.start(SearchQuery::new("cobol")).unwrap();
    transport.wait_for_open(1).await;

    transport.emit_sse(0, &cobol_batch());
    transport.emit_frame(
        0,
        "match_results",
        r#"{"matches":[{"practitioner_id":"intruder"}],"explanations_pending":true}"#,
    );
    transport.emit_sse(0, &explanation_frame("ghost", 1, 3));
    settle().await;

    let snapshot = session.snapshot();
    let ids: Vec<_> = snapshot
        .items()
        .iter()
        .map(|i| i.practitioner_id.as_str())
        .collect();
    assert_eq!(ids, vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_stale_id_leaves_state_unchanged() {
    let (session, transport) = scripted_session();
    session.start(SearchQuery::new("cobol")).unwrap();
    transport.wait_for_open(1).await;

    transport.emit_sse(0, &cobol_batch());
    let before = wait_until(&session, |s| s.items().len() == 3).await;

    transport.emit_sse(0, &explanation_frame("not-in-session", 1, 3));
    settle().await;

    let after = session.snapshot();
    assert_eq!(after.items(), before.items());
    assert_eq!(after.completed(), before.completed());
    assert_eq!(after.status_message(), before.status_message());
    assert_eq!(after.stage(), before.stage());
}

#[tokio::test]
async fn test_item_error_keeps_session_running() {
    let (session, transport) = scripted_session();
    session.start(SearchQuery::new("cobol")).unwrap();
    transport.wait_for_open(1).await;

    transport.emit_sse(0, &cobol_batch());
    transport.emit_frame(
        0,
        "explanation_error",
        r#"{"practitioner_id":"p2","message":"model timeout"}"#,
    );

    let snapshot = wait_until(&session, |s| {
        s.item("p2")
            .is_some_and(|i| i.explanation_status == ExplanationStatus::Error)
    })
    .await;
    assert_eq!(snapshot.stage(), SessionStage::Enriching);
    assert!(snapshot.is_stream_active());
    assert_eq!(
        snapshot.item("p1").unwrap().explanation_status,
        ExplanationStatus::Loading
    );
}

#[tokio::test]
async fn test_server_error_keeps_partial_results() {
    let (session, transport) = scripted_session();
    let run = session.start(SearchQuery::new("cobol")).unwrap();
    transport.wait_for_open(1).await;

    transport.emit_sse(0, &cobol_batch());
    transport.emit_sse(0, &explanation_frame("p1", 1, 3));
    transport.emit_frame(0, "error", r#"{"message":"LLM quota exceeded"}"#);

    let snapshot = session.settled(run).await;
    assert_eq!(snapshot.stage(), SessionStage::Error);
    assert_eq!(snapshot.error(), Some("LLM quota exceeded"));
    assert_eq!(snapshot.status_message(), "Error: LLM quota exceeded");
    assert_eq!(snapshot.items().len(), 3);
    assert!(transport.is_cancelled(0));
}

#[tokio::test]
async fn test_transport_failure_surfaces_user_message() {
    let (session, transport) = scripted_session();
    let run = session.start(SearchQuery::new("cobol")).unwrap();
    transport.wait_for_open(1).await;

    transport.emit_sse(0, &cobol_batch());
    transport.emit(
        0,
        TransportEvent::Failed(
            matchstream::core::error::TransportError::NetworkChanged("reset".to_string()),
        ),
    );

    let snapshot = session.settled(run).await;
    assert_eq!(snapshot.stage(), SessionStage::Error);
    assert_eq!(
        snapshot.error(),
        Some("Network connection changed during streaming. Please try again.")
    );
    assert!(snapshot.is_retryable());
    assert_eq!(snapshot.items().len(), 3);
}

#[tokio::test]
async fn test_early_close_is_incomplete_stream() {
    let (session, transport) = scripted_session();
    let run = session.start(SearchQuery::new("cobol")).unwrap();
    transport.wait_for_open(1).await;

    transport.emit_sse(0, &cobol_batch());
    transport.emit(0, TransportEvent::Closed);

    let snapshot = session.settled(run).await;
    assert_eq!(snapshot.stage(), SessionStage::Error);
    assert!(snapshot.error().unwrap().contains("closed before"));
}
