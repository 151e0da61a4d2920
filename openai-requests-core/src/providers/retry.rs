//! Retry policy and orchestration for any fallible async operation
//!
//! The operation is a zero-argument closure returning a future, so the retry
//! loop knows nothing about the call it repeats. Attempts are separated by a
//! fixed delay; every failure is annotated with the 1-based attempt number
//! through [`AnnotateAttempts`], so the error that escapes carries the total.

use crate::config::RetrySettings;
use crate::error::{AnnotateAttempts, ClientError, ClientResult};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// Default number of attempts, including the first one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between attempts
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Create a policy making at most `max_attempts` calls, `delay` apart.
    ///
    /// A policy must run the operation at least once, so zero attempts is
    /// rejected.
    pub fn new(max_attempts: u32, delay: Duration) -> ClientResult<Self> {
        if max_attempts == 0 {
            return Err(ClientError::InvalidRetryPolicy { max_attempts });
        }
        Ok(Self {
            max_attempts,
            delay,
        })
    }

    /// Create a policy that calls the operation exactly once
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }

    /// Total attempts, including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between two attempts
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl TryFrom<&RetrySettings> for RetryPolicy {
    type Error = ClientError;

    fn try_from(settings: &RetrySettings) -> ClientResult<Self> {
        Self::new(settings.max_attempts, Duration::from_millis(settings.delay_ms))
    }
}

/// Call `operation` until it succeeds or the policy runs out of attempts.
///
/// `name` identifies the operation in log lines. The last error is returned
/// as is, apart from its attempt annotation.
pub async fn retry<T, E, F, Fut>(name: &str, policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: AnnotateAttempts + Display,
{
    let all_start = Instant::now();
    let mut attempt = 0;

    loop {
        let start = Instant::now();
        match operation().await {
            Ok(result) => {
                let elapsed = start.elapsed().as_secs_f64();
                if attempt > 0 {
                    info!(
                        "{} completed in {:.3}s [all {} attempts took {:.3}s]",
                        name,
                        elapsed,
                        attempt + 1,
                        all_start.elapsed().as_secs_f64()
                    );
                } else {
                    info!("{} completed in {:.3}s", name, elapsed);
                }
                return Ok(result);
            }
            Err(err) => {
                let elapsed = start.elapsed().as_secs_f64();
                let err = err.annotate_attempts(attempt + 1);

                if attempt + 1 >= policy.max_attempts() {
                    info!(
                        "All {} attempts to call {} failed in {:.3}s, last error: {}",
                        policy.max_attempts(),
                        name,
                        all_start.elapsed().as_secs_f64(),
                        err
                    );
                    return Err(err);
                }

                info!(
                    "Attempt {} to call {} failed in {:.3}s with error: {}",
                    attempt + 1,
                    name,
                    elapsed,
                    err
                );
                tokio::time::sleep(policy.delay()).await;
                attempt += 1;
            }
        }
    }
}

/// Executor for retry operations bound to one policy
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Create an executor from configured retry settings
    pub fn from_settings(settings: &RetrySettings) -> ClientResult<Self> {
        Ok(Self::new(RetryPolicy::try_from(settings)?))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute an operation with retry logic
    pub async fn execute<T, E, F, Fut>(&self, name: &str, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: AnnotateAttempts + Display,
    {
        retry(name, &self.policy, operation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestError;
    use std::cell::Cell;

    fn server_error() -> ClientError {
        RequestError::new("Request to gpt-4o failed", 500, "Internal Server Error", None).into()
    }

    #[test]
    fn test_retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(), Duration::from_millis(300));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = RetryPolicy::new(0, Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRetryPolicy { max_attempts: 0 }));
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = RetrySettings {
            max_attempts: 5,
            delay_ms: 50,
        };
        let policy = RetryPolicy::try_from(&settings).unwrap();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.delay(), Duration::from_millis(50));

        let settings = RetrySettings {
            max_attempts: 0,
            delay_ms: 50,
        };
        assert!(RetryExecutor::from_settings(&settings).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_failures() {
        let calls = Cell::new(0);
        let start = Instant::now();

        let result: ClientResult<&str> = retry("flaky", &RetryPolicy::default(), || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(server_error())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
        // One delay per failed attempt, none after the success
        assert_eq!(start.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_annotate_error() {
        let start = Instant::now();
        let err = retry("broken", &RetryPolicy::default(), || async {
            Err::<(), _>(server_error())
        })
        .await
        .unwrap_err();

        assert_eq!(err.as_request_error().and_then(|e| e.attempts), Some(3));
        assert_eq!(
            err.to_string(),
            "Request to gpt-4o failed [made 3 attempts]: 500 Internal Server Error"
        );
        assert_eq!(start.elapsed(), Duration::from_millis(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_never_sleeps() {
        let start = Instant::now();
        let err = RetryExecutor::new(RetryPolicy::no_retry())
            .execute("once", || async { Err::<(), _>(server_error()) })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.as_request_error().and_then(|e| e.attempts), Some(1));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_protocol_errors_pass_through_unannotated() {
        let calls = Cell::new(0);
        let err = retry("garbage", &RetryPolicy::default(), || {
            calls.set(calls.get() + 1);
            async {
                Err::<(), _>(ClientError::MalformedStreamLine {
                    line: "oops".to_string(),
                })
            }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.get(), 3);
        assert!(err.is_protocol_error());
        assert_eq!(err.to_string(), "Got some garbage in stream: \"oops\"");
    }
}
