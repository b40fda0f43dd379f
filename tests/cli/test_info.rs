//! Tests for the get-client-info and show-config CLI commands

use crate::cli::test_helpers::create_cli_test_services;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use matchstream::cli::commands::config::{self, ConfigArgs};
use matchstream::cli::commands::info::{self, InfoArgs};
use matchstream::cli::OutputFormat;
use serial_test::serial;

fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
    format!("{header}.{payload}.sig")
}

#[tokio::test]
async fn test_info_human() {
    let services = create_cli_test_services();

    let result = info::execute(InfoArgs { detailed: false }, &services, OutputFormat::Human).await;
    assert!(result.is_ok());
}

#[tokio::test]
#[serial]
async fn test_info_detailed_with_token() {
    std::env::set_var("MATCHSTREAM_TOKEN", jwt_with_exp(4_102_444_800));
    let services = create_cli_test_services();

    let result = info::execute(InfoArgs { detailed: true }, &services, OutputFormat::Json).await;
    std::env::remove_var("MATCHSTREAM_TOKEN");
    assert!(result.is_ok());
}

#[tokio::test]
#[serial]
async fn test_info_detailed_without_token() {
    std::env::remove_var("MATCHSTREAM_TOKEN");
    let services = create_cli_test_services();

    let result = info::execute(InfoArgs { detailed: true }, &services, OutputFormat::Human).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_show_config_human() {
    let services = create_cli_test_services();

    let result = config::execute(ConfigArgs { all: false }, &services, OutputFormat::Human).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_show_config_all_json() {
    let services = create_cli_test_services();

    let result = config::execute(ConfigArgs { all: true }, &services, OutputFormat::Json).await;
    assert!(result.is_ok());
    assert_eq!(services.parser.vocabulary().rules().len(), 8);
}
