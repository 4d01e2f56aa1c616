/*
[INPUT]:  Mock HTTP responses and temporary files
[OUTPUT]: Test results for feed transports
[POS]:    Integration tests - feed opening
[UPDATE]: When transports or fatal open conditions change
*/

mod common;

use common::{collect_records, field, ndjson_fixture, setup_mock_server};
use logview_adapter::{ClientConfig, FeedLocation, FeedTransport, LogviewClient, LogviewError};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_client_creation() {
    let _client = assert_ok!(LogviewClient::new());
}

#[test]
fn test_client_with_config() {
    let config = ClientConfig::default();
    let _client = assert_ok!(LogviewClient::with_config(config));
}

#[tokio::test]
async fn test_http_feed_streams_records() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/cribl.log"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_fixture(40)))
        .mount(&server)
        .await;

    let client = assert_ok!(LogviewClient::new());
    let location = assert_ok!(FeedLocation::parse(&format!("{}/cribl.log", server.uri())));
    let mut decoder = assert_ok!(client.open_records(&location).await);
    let records = collect_records(&mut decoder).await;

    assert_eq!(records.len(), 40);
    assert_eq!(field(&records[0], "message"), Some("m0"));
    assert_eq!(field(&records[39], "message"), Some("m39"));
    assert!(decoder.is_released());
}

#[tokio::test]
async fn test_http_failure_status_is_fatal() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/logs"))
        .respond_with(ResponseTemplate::new(503).set_body_string("{\"a\":1}\n"))
        .mount(&server)
        .await;

    let client = assert_ok!(LogviewClient::new());
    let location = assert_ok!(FeedLocation::parse(&format!("{}/logs", server.uri())));
    let err = client
        .open_records(&location)
        .await
        .expect_err("503 must not be decoded");

    match err {
        LogviewError::Status { code, reason } => {
            assert_eq!(code, 503);
            assert_eq!(reason, "Service Unavailable");
        }
        other => panic!("Expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_no_content_means_missing_body() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/logs"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = assert_ok!(LogviewClient::new());
    let location = assert_ok!(FeedLocation::parse(&format!("{}/logs", server.uri())));
    let response = assert_ok!(client.open(&location).await);
    assert!(!response.has_body());
    assert!(matches!(response.into_body(), Err(LogviewError::MissingBody)));
}

#[tokio::test]
async fn test_http_empty_body_is_an_empty_feed() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/logs"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = assert_ok!(LogviewClient::new());
    let location = assert_ok!(FeedLocation::parse(&format!("{}/logs", server.uri())));
    let mut decoder = assert_ok!(client.open_records(&location).await);
    assert!(collect_records(&mut decoder).await.is_empty());
}

#[tokio::test]
async fn test_file_feed_reads_records() {
    let dir = std::env::temp_dir().join(format!("logview-adapter-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.expect("create temp dir");
    let file = dir.join("feed.ndjson");
    tokio::fs::write(&file, "{\"_time\":\"1\",\"message\":\"a\"}\nbad\n{\"message\":\"b\"}")
        .await
        .expect("write fixture");

    let client = assert_ok!(LogviewClient::new());
    let mut decoder = assert_ok!(client.open_records(&FeedLocation::File(file.clone())).await);
    let records = collect_records(&mut decoder).await;
    let _ = tokio::fs::remove_dir_all(&dir).await;

    assert_eq!(records.len(), 2);
    assert_eq!(decoder.stats().malformed_lines, 1);
}

#[tokio::test]
async fn test_missing_file_is_an_io_error() {
    let client = assert_ok!(LogviewClient::new());
    let location = FeedLocation::File("/definitely/not/here.ndjson".into());
    let err = client
        .open_records(&location)
        .await
        .expect_err("missing file");
    assert!(err.is_transport_error());
}
