//! Shared helpers for the integration tests

#![allow(dead_code)]

use openai_requests_core::config::ConnectionConfig;
use openai_requests_core::http::HttpClient;
use openai_requests_core::OpenAIClient;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

pub const API_KEY: &str = "sk-test-0123456789";

/// Route client logs to the test output; `RUST_LOG` selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Client pointed at a mock server
pub fn client_for(server: &MockServer) -> OpenAIClient {
    init_tracing();
    let http = HttpClient::with_config(&server.uri(), &ConnectionConfig::default())
        .expect("Failed to create HTTP client");
    OpenAIClient::with_http_client(http)
}

/// Non-streamed completion body with a single choice
pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
    })
}

/// One `data:` line carrying a content delta
pub fn delta_line(content: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({"choices": [{"index": 0, "delta": {"content": content}}]})
    )
}
