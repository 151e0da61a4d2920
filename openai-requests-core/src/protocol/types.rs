//! Request and response data for the chat completion protocol

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

// ============================================================================
// Messages
// ============================================================================

/// One entry of the conversation history.
///
/// Roles are plain strings (`system`, `user`, `assistant`, ...). They are
/// not validated here; the provider decides what it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Create a message with an arbitrary role
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    fn to_value(&self) -> Value {
        json!({"role": self.role, "content": self.content})
    }
}

// ============================================================================
// Usage
// ============================================================================

/// Token accounting reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Usage {
    /// Decode a `usage` object taken from a response
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Usage::deserialize(value)
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Usage:\n * prompt tokens: {}\n * completion tokens: {}\n * total tokens: {}",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}

// ============================================================================
// Request descriptor
// ============================================================================

/// Caller supplied request fields merged into the body (temperature, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestOptions {
    fields: Map<String, Value>,
}

impl RequestOptions {
    /// Create an empty set of options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an arbitrary field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(self, temperature: f64) -> Self {
        self.with("temperature", temperature)
    }

    /// Set the completion token limit
    pub fn with_max_tokens(self, max_tokens: u64) -> Self {
        self.with("max_tokens", max_tokens)
    }

    /// Set nucleus sampling
    pub fn with_top_p(self, top_p: f64) -> Self {
        self.with("top_p", top_p)
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

impl From<Map<String, Value>> for RequestOptions {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Build the JSON body of a chat completion request.
///
/// `model` and `messages` go in first, then the caller's options, which may
/// replace them.
pub fn build_chat_request(
    model: &str,
    messages: &[ChatMessage],
    options: Option<&RequestOptions>,
) -> Map<String, Value> {
    let mut request = Map::new();
    request.insert("model".to_string(), Value::String(model.to_string()));
    request.insert(
        "messages".to_string(),
        Value::Array(messages.iter().map(ChatMessage::to_value).collect()),
    );
    if let Some(options) = options {
        for (key, value) in options.iter() {
            request.insert(key.clone(), value.clone());
        }
    }
    request
}

/// Build the JSON body of a streamed chat completion request.
///
/// The protocol fields are written after the caller's options so they
/// cannot be overridden.
pub fn build_stream_request(
    model: &str,
    messages: &[ChatMessage],
    options: Option<&RequestOptions>,
    include_usage: bool,
) -> Map<String, Value> {
    let mut request = build_chat_request(model, messages, options);
    request.insert("stream".to_string(), Value::Bool(true));
    if include_usage {
        let mut stream_options = Map::new();
        stream_options.insert("include_usage".to_string(), Value::Bool(true));
        request.insert("stream_options".to_string(), Value::Object(stream_options));
    }
    request
}
