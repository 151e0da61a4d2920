//! Tests for the retry orchestrator

mod common;

use common::{client_for, completion_body, API_KEY};
use openai_requests_core::{retry, ChatMessage, ClientError, RequestError, RetryPolicy};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn unavailable() -> RequestError {
    RequestError::new("Request to gpt-4o failed", 503, "Service Unavailable", None)
}

#[tokio::test(start_paused = true)]
async fn test_delay_count_matches_failures() {
    let calls = AtomicU32::new(0);
    let start = Instant::now();

    let value = retry("flaky", &RetryPolicy::default(), || {
        let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if attempt <= 2 {
                Err(unavailable())
            } else {
                Ok(attempt)
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(value, 3);
    assert_eq!(start.elapsed(), Duration::from_millis(600));
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_success_has_no_delay() {
    let start = Instant::now();

    let value = retry("steady", &RetryPolicy::default(), || async {
        Ok::<_, RequestError>("fine")
    })
    .await
    .unwrap();

    assert_eq!(value, "fine");
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_final_error_carries_attempt_count() {
    let calls = AtomicU32::new(0);
    let policy = RetryPolicy::new(4, Duration::from_millis(50)).unwrap();

    let err = retry("down", &policy, || {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Err::<(), _>(unavailable()) }
    })
    .await
    .unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(err.attempts, Some(4));
    assert_eq!(
        err.to_string(),
        "Request to gpt-4o failed [made 4 attempts]: 503 Service Unavailable"
    );
}

#[test]
fn test_zero_attempt_policy_is_rejected() {
    match RetryPolicy::new(0, Duration::from_millis(300)) {
        Err(ClientError::InvalidRetryPolicy { max_attempts }) => assert_eq!(max_attempts, 0),
        other => panic!("Expected InvalidRetryPolicy, got {:?}", other),
    }
}

#[tokio::test]
async fn test_retry_wraps_completion_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("recovered")))
        .with_priority(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = [ChatMessage::user("ping")];
    let policy = RetryPolicy::new(3, Duration::from_millis(10)).unwrap();

    let text = retry("request_completion", &policy, || {
        client.request_completion(&messages, "gpt-4o-mini", API_KEY, None, None)
    })
    .await
    .unwrap();

    assert_eq!(text, "recovered");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_retry_gives_up_on_persistent_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = [ChatMessage::user("ping")];
    let policy = RetryPolicy::new(2, Duration::from_millis(10)).unwrap();

    let err = retry("request_completion", &policy, || {
        client.request_completion(&messages, "gpt-4o-mini", API_KEY, None, None)
    })
    .await
    .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.as_request_error().and_then(|e| e.attempts), Some(2));
}
