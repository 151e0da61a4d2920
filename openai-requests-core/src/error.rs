//! Error types shared by every request shape
//!
//! Failures fall into three groups:
//! - [`RequestError`]: the API answered with a non-200 status
//! - protocol errors: a 200 answer that does not follow the expected framing
//! - transport and decode errors, passed through from `reqwest` / `serde_json`

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// A non-success HTTP response from any endpoint.
///
/// `attempts` stays `None` unless the error escaped a retry loop, in which
/// case it holds the 1-based number of attempts that were made.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestError {
    /// Human readable context, e.g. `Request to gpt-4o failed`
    pub message: String,

    /// HTTP status code
    pub status: u16,

    /// Transport reason phrase, optionally followed by `, <error code>`
    pub reason: String,

    /// Decoded JSON error body, when the server sent one
    pub details_for_logging: Option<Value>,

    /// Attempts made before giving up (set by the retry loop)
    pub attempts: Option<u32>,
}

impl RequestError {
    /// Create a new request error without attempt information
    pub fn new(
        message: impl Into<String>,
        status: u16,
        reason: impl Into<String>,
        details_for_logging: Option<Value>,
    ) -> Self {
        Self {
            message: message.into(),
            status,
            reason: reason.into(),
            details_for_logging,
            attempts: None,
        }
    }

    /// Return the same error annotated with the number of attempts made
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    /// Provider error code carried in the details, if any (`error.code`)
    pub fn error_code(&self) -> Option<&str> {
        self.details_for_logging
            .as_ref()
            .and_then(|details| details.get("error"))
            .and_then(|error| error.get("code"))
            .and_then(Value::as_str)
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(attempts) = self.attempts {
            write!(f, " [made {} attempts]", attempts)?;
        }
        write!(f, ": {} {}", self.status, self.reason)
    }
}

impl std::error::Error for RequestError {}

/// Errors that can occur when calling the API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-200 status
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A 200 streaming answer with the wrong content type
    #[error("Expected content type \"text/event-stream\", but got \"{content_type}\"")]
    UnexpectedContentType { content_type: String },

    /// A stream line that is neither blank, the sentinel, nor a data frame
    #[error("Got some garbage in stream: \"{line}\"")]
    MalformedStreamLine { line: String },

    /// A successful completion response without any choice
    #[error("Response from {model} contained no choices")]
    MissingChoice { model: String },

    /// The first choice has no text, e.g. a tool call or a refusal
    #[error("Response from {model} has no message content")]
    MissingContent { model: String },

    /// Connection, timeout or body read failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A body that should have been JSON could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A retry policy that would never run the operation
    #[error("Retry policy needs at least one attempt, got {max_attempts}")]
    InvalidRetryPolicy { max_attempts: u32 },

    /// The HTTP client could not be constructed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// The request error inside, if this is a non-200 failure
    pub fn as_request_error(&self) -> Option<&RequestError> {
        match self {
            ClientError::Request(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status for non-200 failures
    pub fn status(&self) -> Option<u16> {
        self.as_request_error().map(|err| err.status)
    }

    /// Whether this is a framing/content-type violation of a 200 response
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            ClientError::UnexpectedContentType { .. } | ClientError::MalformedStreamLine { .. }
        )
    }
}

/// Errors that can record how many attempts were spent on them.
///
/// The retry loop calls [`AnnotateAttempts::annotate_attempts`] after every
/// failed attempt. Only request errors carry the count.
pub trait AnnotateAttempts: Sized {
    /// Return the error with its attempt count set to `attempts`
    fn annotate_attempts(self, attempts: u32) -> Self;
}

impl AnnotateAttempts for RequestError {
    fn annotate_attempts(self, attempts: u32) -> Self {
        self.with_attempts(attempts)
    }
}

impl AnnotateAttempts for ClientError {
    fn annotate_attempts(self, attempts: u32) -> Self {
        match self {
            ClientError::Request(err) => ClientError::Request(err.with_attempts(attempts)),
            other => other,
        }
    }
}
