//! Streaming support for OpenAI chat completions
//!
//! The body of a streamed completion is a sequence of lines. After trimming,
//! every line is exactly one of:
//! - blank: ignored
//! - `data: [DONE]`: end of the stream
//! - `data: <json>`: a frame that may carry a content delta and/or usage
//! - anything else: a protocol violation that aborts the stream

use super::types::OpenAIStreamChunk;
use crate::error::{ClientError, ClientResult};
use crate::protocol::{SharedUsageSink, Usage, UsageSink};
use crate::providers::CompletionStream;
use async_stream::stream;
use futures::{Stream, StreamExt};
use tracing::{debug, trace};
use uuid::Uuid;

/// Line that terminates a stream
pub const DONE_LINE: &str = "data: [DONE]";

/// Prefix of a data frame
pub const DATA_PREFIX: &str = "data: ";

/// Classification of one trimmed stream line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamLine<'a> {
    Blank,
    Done,
    /// JSON payload of a data frame, prefix removed
    Data(&'a str),
}

/// Classify a raw line. Surrounding whitespace is ignored.
pub fn classify_line(line: &str) -> ClientResult<StreamLine<'_>> {
    let line = line.trim();
    if line.is_empty() {
        Ok(StreamLine::Blank)
    } else if line == DONE_LINE {
        Ok(StreamLine::Done)
    } else if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
        Ok(StreamLine::Data(payload))
    } else {
        Err(ClientError::MalformedStreamLine {
            line: line.to_string(),
        })
    }
}

/// What a single data frame contributes
#[derive(Debug, Default, PartialEq)]
pub struct Frame {
    /// `delta.content` of the first choice
    pub content: Option<String>,
    /// Raw `usage` object, if the frame has one
    pub usage: Option<serde_json::Value>,
}

/// Decode the JSON payload of a data frame
pub fn parse_frame(payload: &str) -> ClientResult<Frame> {
    let chunk: OpenAIStreamChunk = serde_json::from_str(payload)?;
    let content = chunk
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.delta.content);
    Ok(Frame {
        content,
        usage: chunk.usage,
    })
}

/// Result of feeding one line to the state machine
#[derive(Debug, PartialEq)]
pub enum LineOutcome {
    /// Nothing to emit, keep reading
    Skip,
    /// Emit a text fragment, keep reading
    Fragment(String),
    /// The sentinel was seen
    Done,
}

/// Run one line through the state machine.
///
/// Usage and content are extracted independently: a frame may carry both,
/// either, or neither.
pub fn process_line(line: &str, usage_sink: Option<&dyn UsageSink>) -> ClientResult<LineOutcome> {
    match classify_line(line)? {
        StreamLine::Blank => Ok(LineOutcome::Skip),
        StreamLine::Done => Ok(LineOutcome::Done),
        StreamLine::Data(payload) => {
            let frame = parse_frame(payload)?;
            if let (Some(sink), Some(usage)) = (usage_sink, frame.usage.as_ref()) {
                sink.record_usage(Usage::from_value(usage)?);
            }
            Ok(match frame.content {
                Some(content) => LineOutcome::Fragment(content),
                None => LineOutcome::Skip,
            })
        }
    }
}

/// Decode one raw line. A line that is not valid UTF-8 is garbage.
pub fn decode_line(raw: Vec<u8>) -> ClientResult<String> {
    String::from_utf8(raw).map_err(|e| ClientError::MalformedStreamLine {
        line: String::from_utf8_lossy(e.as_bytes()).trim().to_string(),
    })
}

/// Splits a byte stream into raw lines.
///
/// Chunks may end in the middle of a line (or of a UTF-8 sequence); bytes are
/// held back until the newline arrives. Lines are returned undecoded, newline
/// included.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// Bytes of `pending` already known to hold no newline
    scanned: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.pending[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset + 1;
            lines.push(self.pending[start..end].to_vec());
            start = end;
            from = end;
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();
        lines
    }

    /// Return the unterminated last line, if any
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        self.scanned = 0;
        if self.pending.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.pending))
    }
}

/// Turn a stream of body chunks into a lazy stream of text fragments.
///
/// The chunk stream (and with it the HTTP connection) is owned by the
/// returned stream, so it is released as soon as the fragment stream ends,
/// fails, or is dropped by the consumer.
pub fn parse_stream<S, E>(
    chunks: S,
    usage_sink: Option<SharedUsageSink>,
    request_id: Uuid,
) -> CompletionStream
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Send + 'static,
    E: Into<ClientError> + Send + 'static,
{
    Box::pin(stream! {
        let mut chunks = Box::pin(chunks);
        let mut lines = LineBuffer::new();
        let mut fragments = 0usize;
        let mut exhausted = false;

        while !exhausted {
            let batch = match chunks.next().await {
                Some(Ok(bytes)) => lines.push(&bytes),
                Some(Err(e)) => {
                    let err: ClientError = e.into();
                    yield Err(err);
                    return;
                }
                None => {
                    exhausted = true;
                    lines.finish().into_iter().collect()
                }
            };

            for raw in batch {
                let line = match decode_line(raw) {
                    Ok(line) => line,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                debug!("Got: [{}] [request_id: {}]", line.trim_end(), request_id);
                match process_line(&line, usage_sink.as_deref()) {
                    Ok(LineOutcome::Skip) => {}
                    Ok(LineOutcome::Fragment(text)) => {
                        fragments += 1;
                        yield Ok(text);
                    }
                    Ok(LineOutcome::Done) => {
                        debug!("Stream completed with {} fragments [request_id: {}]", fragments, request_id);
                        return;
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }
        }

        trace!("Stream ended without [DONE] after {} fragments [request_id: {}]", fragments, request_id);
    })
}

/// Drain a fragment stream into one string
pub async fn collect_text(mut stream: CompletionStream) -> ClientResult<String> {
    let mut text = String::new();
    while let Some(fragment) = stream.next().await {
        text.push_str(&fragment?);
    }
    Ok(text)
}
