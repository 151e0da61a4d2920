//! OpenAI Requests Core Library
//!
//! Asynchronous access to the OpenAI API: audio transcription, single-shot
//! chat completions and streamed chat completions, plus a generic retry
//! wrapper that can repeat any of them.
//!
//! ```no_run
//! use openai_requests_core::{retry, ChatMessage, OpenAIClient, RetryPolicy, UsageRecorder};
//!
//! # async fn run() -> Result<(), openai_requests_core::ClientError> {
//! let client = OpenAIClient::new()?;
//! let messages = [ChatMessage::user("Hello!")];
//! let usage = UsageRecorder::new();
//!
//! let answer = retry("request_completion", &RetryPolicy::default(), || {
//!     client.request_completion(&messages, "gpt-4o-mini", "sk-...", None, Some(&usage))
//! })
//! .await?;
//!
//! println!("{}", answer);
//! if let Some(usage) = usage.last() {
//!     println!("{}", usage);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod protocol;
pub mod providers;

pub use config::ClientConfig;
pub use error::{AnnotateAttempts, ClientError, ClientResult, RequestError};
pub use protocol::{
    ChatMessage, RequestOptions, SharedUsageSink, Usage, UsageRecorder, UsageSink,
};
pub use providers::openai::collect_text;
pub use providers::retry::RetryExecutor;
pub use providers::{retry, CompletionProvider, CompletionStream, OpenAIClient, RetryPolicy};

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
