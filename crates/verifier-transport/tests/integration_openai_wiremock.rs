//! Integration tests for `HttpTransport` against a mocked OpenAI-compatible
//! surface.

use verifier_transport::client::TransportConfig;
use verifier_transport::openai::HttpTransport;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(base_url: String, credential: &str) -> HttpTransport {
    HttpTransport::new(base_url, credential, Vec::new(), &TransportConfig::default()).unwrap()
}

#[tokio::test]
async fn chat_completions_returns_parsed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-123",
            "model": "gpt-4",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello from mock API!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        })))
        .mount(&mock_server)
        .await;

    let transport = transport(mock_server.uri(), "test-key");
    let response = transport
        .chat_completions(serde_json::json!({"model": "gpt-4", "messages": []}))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body["model"], "gpt-4");
    assert_eq!(response.body["usage"]["total_tokens"], 15);
}

#[tokio::test]
async fn rate_limit_surfaces_retry_after() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429)
                .set_body_json(serde_json::json!({"error": {"message": "rate limited"}}))
                .insert_header("retry-after", "60"),
        )
        .mount(&mock_server)
        .await;

    let transport = transport(mock_server.uri(), "test-key");
    let err = transport
        .chat_completions(serde_json::json!({"model": "gpt-4", "messages": []}))
        .await
        .unwrap_err();

    match err {
        verifier_transport::TransportError::RateLimited { retry_after_secs } => {
            assert_eq!(retry_after_secs, Some(60));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_server_variant() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let transport = transport(mock_server.uri(), "test-key");
    let err = transport
        .chat_completions(serde_json::json!({"model": "gpt-4", "messages": []}))
        .await
        .unwrap_err();

    assert!(matches!(err, verifier_transport::TransportError::Server(503)));
}

#[tokio::test]
async fn unauthorized_maps_to_unauthorized_variant() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Invalid API key"}
        })))
        .mount(&mock_server)
        .await;

    let transport = transport(mock_server.uri(), "invalid-key");
    let err = transport
        .chat_completions(serde_json::json!({"model": "gpt-4", "messages": []}))
        .await
        .unwrap_err();

    assert!(matches!(err, verifier_transport::TransportError::Unauthorized(_)));
}

#[tokio::test]
async fn list_models_sends_bearer_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [{"id": "gpt-4", "object": "model"}]
        })))
        .mount(&mock_server)
        .await;

    let transport = transport(mock_server.uri(), "test-key");
    let response = transport.list_models().await.unwrap();

    assert_eq!(response.body["data"][0]["id"], "gpt-4");
}

#[tokio::test]
async fn response_headers_are_captured_case_insensitively() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"object": "list", "data": []}))
                .insert_header("X-RateLimit-Remaining-Requests", "42"),
        )
        .mount(&mock_server)
        .await;

    let transport = transport(mock_server.uri(), "test-key");
    let response = transport.list_models().await.unwrap();

    assert_eq!(
        response.headers.get("x-ratelimit-remaining-requests"),
        Some("42")
    );
}
