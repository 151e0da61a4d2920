//! OpenAI provider implementation
//!
//! Transcription, plain chat completions and streamed chat completions
//! against the OpenAI REST API.

mod client;
pub mod streaming;
pub mod types;

pub use client::{OpenAIClient, DEFAULT_TRANSCRIPTION_MODEL};
pub use streaming::collect_text;
pub use types::{OpenAIResponse, OpenAIStreamChunk};
