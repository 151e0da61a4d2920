//! Tests for audio transcription against a mocked API

mod common;

use common::{client_for, API_KEY};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_transcription_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(header("authorization", "Bearer sk-test-0123456789"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("filename=\"temp.webm\""))
        .and(body_string_contains("whisper-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "hello world"})))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .transcribe(b"fake audio".to_vec(), API_KEY, None)
        .await
        .unwrap();
    assert_eq!(text, "hello world");
}

#[tokio::test]
async fn test_transcription_with_explicit_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .and(body_string_contains("gpt-4o-transcribe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server)
        .transcribe(vec![0u8; 16], API_KEY, Some("gpt-4o-transcribe"))
        .await
        .unwrap();
    assert_eq!(text, "ok");
}

#[tokio::test]
async fn test_transcription_error_ignores_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "Invalid file format", "code": "invalid_file"}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .transcribe(b"not audio".to_vec(), API_KEY, None)
        .await
        .unwrap_err();

    let request_error = err.as_request_error().expect("Expected a request error");
    assert_eq!(request_error.status, 400);
    assert_eq!(request_error.reason, "Bad Request");
    assert!(request_error.details_for_logging.is_none());
    assert_eq!(err.to_string(), "Request to whisper-1 failed: 400 Bad Request");
}
