//! Protocol module for chat completion request/response data
//!
//! This module defines the messages, request descriptor and usage records
//! exchanged with the API, plus the [`UsageSink`] capability used to report
//! token usage back to the caller.

pub mod types;
pub mod usage;

pub use types::{build_chat_request, build_stream_request, ChatMessage, RequestOptions, Usage};
pub use usage::{SharedUsageSink, UsageRecorder, UsageSink};
