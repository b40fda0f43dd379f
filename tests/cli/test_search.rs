//! Tests for the search CLI command

use crate::cli::test_helpers::services_for_server;
use crate::common::helpers::ServerScript;
use crate::common::{
    body, cobol_batch, cobol_stream, scripted_session, spawn_sse_server, split_into, wait_until,
};
use matchstream::cli::commands::search::{
    execute, follow_until, SearchArgs, SearchResponseOutput,
};
use matchstream::cli::OutputFormat;
use matchstream::core::session::SessionStage;
use matchstream::core::types::SearchQuery;
use std::time::Duration;
use tokio::sync::oneshot;

fn args(query: &str) -> SearchArgs {
    SearchArgs {
        query: query.to_string(),
        limit: Some(3),
        no_explanations: false,
        parse: true,
        quiet: true,
    }
}

#[tokio::test]
async fn test_search_human() {
    let server = spawn_sse_server(ServerScript::ok(split_into(&body(&cobol_stream()), 17))).await;
    let services = services_for_server(&server.url);

    let result = execute(args("COBOL mainframe"), &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "search should succeed: {result:?}");
}

#[tokio::test]
async fn test_search_json() {
    let server = spawn_sse_server(ServerScript::ok(vec![body(&cobol_stream())])).await;
    let services = services_for_server(&server.url);

    let result = execute(args("COBOL mainframe"), &services, OutputFormat::Json).await;
    assert!(result.is_ok());

    let raw = server.requests.lock().unwrap()[0].clone();
    assert!(raw.contains(r#""limit":3"#));
    assert!(raw.contains(r#""include_explanations":true"#));
}

#[tokio::test]
async fn test_search_no_explanations_flag() {
    let server = spawn_sse_server(ServerScript::ok(vec![body(&cobol_stream())])).await;
    let services = services_for_server(&server.url);

    let mut search_args = args("cobol");
    search_args.no_explanations = true;
    execute(search_args, &services, OutputFormat::Json)
        .await
        .unwrap();

    let raw = server.requests.lock().unwrap()[0].clone();
    assert!(raw.contains(r#""include_explanations":false"#));
}

#[tokio::test]
async fn test_search_server_error_is_reported() {
    let frames = vec![
        cobol_batch(),
        crate::common::sse_frame("error", &serde_json::json!({"message": "LLM quota exceeded"})),
    ];
    let server = spawn_sse_server(ServerScript::ok(vec![body(&frames)])).await;
    let services = services_for_server(&server.url);

    let err = execute(args("cobol"), &services, OutputFormat::Human)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "LLM quota exceeded");
}

#[tokio::test]
async fn test_search_empty_query_rejected() {
    let server = spawn_sse_server(ServerScript::ok(vec![])).await;
    let services = services_for_server(&server.url);

    let err = execute(args("   "), &services, OutputFormat::Human)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Query cannot be empty"));
}

#[tokio::test]
async fn test_output_from_snapshot_parses_explanations() {
    let server = spawn_sse_server(ServerScript::ok(vec![body(&cobol_stream())])).await;
    let services = services_for_server(&server.url);

    let session = services.session();
    let run = session.start(SearchQuery::new("COBOL mainframe")).unwrap();
    let snapshot = session.settled(run).await;
    assert_eq!(snapshot.stage(), SessionStage::Complete);

    let output = SearchResponseOutput::from_snapshot(&snapshot, &services, true);
    assert_eq!(output.results.len(), 3);
    assert_eq!(output.results[0].rank, 1);
    assert_eq!(output.results[0].score_band, "Excellent Match");
    assert_eq!(output.results[2].score_band, "Fair Match");
    assert_eq!(
        output.results[0].keywords.phrases,
        vec!["mainframe modernization"]
    );

    let parsed = output.results[0].parsed_explanation.as_ref().unwrap();
    assert_eq!(parsed.report().unwrap().linkedin.score, 8);

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["stage"], "complete");
    assert_eq!(json["progress_percent"], 100);
}

#[tokio::test]
async fn test_interrupt_cancels_and_keeps_partial_results() {
    let (session, transport) = scripted_session();
    let run = session.start(SearchQuery::new("COBOL mainframe")).unwrap();
    transport.wait_for_open(1).await;
    transport.emit_sse(0, &cobol_batch());
    wait_until(&session, |s| s.items().len() == 3).await;

    // Interrupt fires while the follower is idle between snapshots
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = tx.send(());
    });
    let interrupt = async {
        let _ = rx.await;
    };

    let snapshot = tokio::time::timeout(
        crate::common::helpers::WAIT,
        follow_until(&session, run, true, interrupt),
    )
    .await
    .expect("follower should stop once interrupted");

    assert_eq!(snapshot.stage(), SessionStage::Idle);
    assert_eq!(snapshot.status_message(), "Search cancelled");
    assert_eq!(snapshot.items().len(), 3);
    assert!(transport.is_cancelled(0));
}
