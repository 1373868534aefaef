//! Integration tests for PageFetcher using wiremock
//!
//! These tests validate the HTTP fetcher's behavior with mock servers.

mod common;

use newsbridge::crawler::fetcher::PageFetcher;
use newsbridge::error::FetchError;
use std::time::Duration;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test successful fetch from mock server
#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;
    let html = r#"<!DOCTYPE html>
<html>
<head><title>Test Article</title></head>
<body><h1>ข่าวทดสอบ</h1><p>เนื้อหาข่าว</p></body>
</html>"#;

    Mock::given(method("GET"))
        .and(path("/news/1"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&mock_server)
        .await;

    let fetcher = common::fast_fetcher();
    let result = fetcher
        .fetch_text(&format!("{}/news/1", mock_server.uri()))
        .await;

    assert!(result.is_ok(), "Fetch should succeed: {:?}", result.err());
    let body = result.unwrap();
    assert!(body.contains("ข่าวทดสอบ"));
}

/// Test that server errors trigger retries
#[tokio::test]
async fn test_server_error_retry() {
    let mock_server = MockServer::start().await;

    // Return 503 twice, then succeed
    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/test"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let fetcher = common::fast_fetcher();
    let result = fetcher.fetch_text(&format!("{}/test", mock_server.uri())).await;

    assert_eq!(result.unwrap(), "OK");
}

/// Test 404 does not retry
#[tokio::test]
async fn test_404_no_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/notfound"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1) // Should only be called once (no retry)
        .mount(&mock_server)
        .await;

    let fetcher = common::fast_fetcher();
    let result = fetcher
        .fetch_text(&format!("{}/notfound", mock_server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::ServerError(404))));
}

/// Test max retries exceeded
#[tokio::test]
async fn test_max_retries_exceeded() {
    let mock_server = MockServer::start().await;

    // 1 initial attempt + 2 retries
    Mock::given(method("GET"))
        .and(path("/always-fails"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = common::fast_fetcher();
    let result = fetcher
        .fetch_text(&format!("{}/always-fails", mock_server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::MaxRetriesExceeded)));
}

/// Test rate limit responses are retried
#[tokio::test]
async fn test_rate_limited_then_ok() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .mount(&mock_server)
        .await;

    let fetcher = common::fast_fetcher();
    let result = fetcher.fetch_text(&format!("{}/busy", mock_server.uri())).await;

    assert_eq!(result.unwrap(), "done");
}

/// Test TIS-620 pages declared in Content-Type are decoded
#[tokio::test]
async fn test_tis620_page_is_decoded() {
    let mock_server = MockServer::start().await;
    // "สวัสดี" in TIS-620
    let bytes: Vec<u8> = vec![0xca, 0xc7, 0xd1, 0xca, 0xb4, 0xd5];

    Mock::given(method("GET"))
        .and(path("/legacy"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=tis-620")
                .set_body_bytes(bytes),
        )
        .mount(&mock_server)
        .await;

    let fetcher = common::fast_fetcher();
    let body = fetcher
        .fetch_text(&format!("{}/legacy", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "สวัสดี");
}

/// Test timeout surfaces as a retryable failure
#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::with_config(100, 0, Duration::from_millis(200)).unwrap();
    let result = fetcher.fetch_text(&format!("{}/slow", mock_server.uri())).await;

    assert!(matches!(result, Err(FetchError::MaxRetriesExceeded)));
}
