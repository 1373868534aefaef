//! Integration tests for LlmClient against an OpenAI-compatible mock

use newsbridge::llm::{LlmClient, LlmConfig, LlmError, TextGenerator};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(endpoint: String) -> LlmConfig {
    LlmConfig {
        endpoint,
        api_key: "test-key".to_string(),
        model: "qwen-test".to_string(),
        timeout_secs: 5,
        ..Default::default()
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

#[tokio::test]
async fn test_generate_returns_trimmed_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token("test-key"))
        .and(body_partial_json(json!({"model": "qwen-test"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  测试新闻\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::with_config(config(format!("{}/v1/", server.uri()))).unwrap();
    let answer = client.generate("Translate ข่าวทดสอบ").await.unwrap();

    assert_eq!(answer, "测试新闻");
}

#[tokio::test]
async fn test_error_status_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let client = LlmClient::with_config(config(format!("{}/v1", server.uri()))).unwrap();
    let err = client.generate("hello").await.unwrap_err();

    match err {
        LlmError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_choices_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = LlmClient::with_config(config(format!("{}/v1", server.uri()))).unwrap();
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, LlmError::EmptyResponse));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = LlmClient::with_config(config(format!("{}/v1", server.uri()))).unwrap();
    let err = client.generate("hello").await.unwrap_err();

    assert!(matches!(err, LlmError::InvalidResponse(_)));
}
