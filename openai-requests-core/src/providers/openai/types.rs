//! OpenAI API response types
//!
//! Only the fields the clients read are modelled; everything else in the
//! payloads is ignored.

use crate::protocol::Usage;
use serde::Deserialize;

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,

    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// Message of a chat completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIMessage {
    /// `null` for tool calls and refusals
    #[serde(default)]
    pub content: Option<String>,
}

/// One `data:` frame of a streamed completion
#[derive(Debug, Deserialize)]
pub struct OpenAIStreamChunk {
    #[serde(default)]
    pub choices: Option<Vec<OpenAIStreamChoice>>,

    /// Kept undecoded: it is only turned into a [`Usage`] when somebody
    /// listens for it
    #[serde(default)]
    pub usage: Option<serde_json::Value>,
}

/// Streaming choice
#[derive(Debug, Deserialize)]
pub struct OpenAIStreamChoice {
    pub delta: OpenAIDelta,
}

/// Delta for streaming
#[derive(Debug, Deserialize, Default)]
pub struct OpenAIDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Transcription response
#[derive(Debug, Deserialize)]
pub struct OpenAITranscription {
    pub text: String,
}
