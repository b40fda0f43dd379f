//! Tests for the explain CLI command

use crate::cli::test_helpers::create_cli_test_services;
use crate::common::EXPLANATION;
use matchstream::cli::commands::explain::{execute, ExplainArgs};
use matchstream::cli::OutputFormat;
use std::io::Write;
use tempfile::NamedTempFile;

fn explanation_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_explain_structured_human() {
    let services = create_cli_test_services();
    let file = explanation_file(EXPLANATION);

    let args = ExplainArgs {
        file: Some(file.path().to_path_buf()),
    };
    let result = execute(args, &services, OutputFormat::Human).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_explain_unparsed_json() {
    let services = create_cli_test_services();
    let file = explanation_file("Strong background in legacy systems.");

    let args = ExplainArgs {
        file: Some(file.path().to_path_buf()),
    };
    let result = execute(args, &services, OutputFormat::Json).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_explain_missing_file() {
    let services = create_cli_test_services();

    let args = ExplainArgs {
        file: Some("/nonexistent/explanation.txt".into()),
    };
    let err = execute(args, &services, OutputFormat::Human)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Failed to read"));
}
