//! HTTP layer for talking to the OpenAI API
//!
//! This module wraps the transport for the clients, handling:
//! - Client construction from connection settings
//! - Endpoint paths per call kind
//! - Mapping non-success responses to [`RequestError`](crate::error::RequestError)
//! - Request ID generation and correlation

pub mod client;
pub mod error;

pub use client::HttpClient;
pub use error::{
    normalized_content_type, request_error_from_response, CONTENT_TYPE_EVENT_STREAM,
    CONTENT_TYPE_JSON,
};

use uuid::Uuid;

/// Type of API call being made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// Chat completion, streamed or not
    Chat,
    /// Audio transcription
    Transcription,
}

impl CallKind {
    /// Get the endpoint path for this call kind
    pub fn endpoint(&self) -> &'static str {
        match self {
            CallKind::Chat => "/chat/completions",
            CallKind::Transcription => "/audio/transcriptions",
        }
    }
}

/// Generate a correlation ID for one logical request
pub fn new_request_id() -> Uuid {
    Uuid::new_v4()
}
