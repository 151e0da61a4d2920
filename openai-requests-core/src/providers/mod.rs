//! Provider clients and the retry orchestrator
//!
//! [`CompletionProvider`] is the seam callers program against; the OpenAI
//! client is its only implementation. [`retry`] wraps any fallible async
//! operation, including calls made through a provider.

pub mod openai;
pub mod retry;

pub use openai::OpenAIClient;
pub use retry::{retry, RetryPolicy};

use crate::error::ClientResult;
use crate::protocol::{ChatMessage, RequestOptions, SharedUsageSink, UsageSink};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Lazy sequence of text fragments of a streamed completion.
///
/// Dropping it closes the underlying HTTP response.
pub type CompletionStream = Pin<Box<dyn Stream<Item = ClientResult<String>> + Send>>;

/// Core provider trait for chat completion backends
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider's name
    fn name(&self) -> &str;

    /// Transcribe audio to text
    async fn transcribe(
        &self,
        audio: Vec<u8>,
        api_key: &str,
        model: Option<&str>,
    ) -> ClientResult<String>;

    /// Request a chat completion and return the text of the first choice
    async fn request_completion(
        &self,
        messages: &[ChatMessage],
        model: &str,
        api_key: &str,
        options: Option<&RequestOptions>,
        usage_sink: Option<&dyn UsageSink>,
    ) -> ClientResult<String>;

    /// Request a streamed chat completion
    async fn request_completion_stream(
        &self,
        messages: &[ChatMessage],
        model: &str,
        api_key: &str,
        options: Option<&RequestOptions>,
        usage_sink: Option<SharedUsageSink>,
    ) -> ClientResult<CompletionStream>;
}
