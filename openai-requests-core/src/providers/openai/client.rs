//! OpenAI client implementation

use super::streaming::parse_stream;
use super::types::{OpenAIResponse, OpenAITranscription};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::error::{map_http_error, reason_phrase};
use crate::http::{
    new_request_id, normalized_content_type, request_error_from_response, CallKind, HttpClient,
    CONTENT_TYPE_EVENT_STREAM,
};
use crate::protocol::{
    build_chat_request, build_stream_request, ChatMessage, RequestOptions, SharedUsageSink, Usage,
    UsageSink,
};
use crate::providers::{CompletionProvider, CompletionStream};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Default transcription model
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// File name sent with the audio part
const AUDIO_FILE_NAME: &str = "temp.webm";

/// OpenAI API client
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    http: HttpClient,
}

impl OpenAIClient {
    /// Create a client for the public OpenAI endpoint
    pub fn new() -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::new()?,
        })
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self {
            http: HttpClient::with_config(&config.base_url, &config.connection)?,
        })
    }

    /// Create a client on top of an existing HTTP client
    pub fn with_http_client(http: HttpClient) -> Self {
        Self { http }
    }

    /// Base URL requests go to
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Transcribe audio to text.
    ///
    /// Unlike the completion calls, a failed transcription does not look at
    /// the response body: the error carries only status and reason.
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        api_key: &str,
        model: Option<&str>,
    ) -> ClientResult<String> {
        let model = model.unwrap_or(DEFAULT_TRANSCRIPTION_MODEL);
        let request_id = new_request_id();

        info!(
            "Sending transcription request to {} ({} bytes) [request_id: {}]",
            model,
            audio.len(),
            request_id
        );

        let form = Form::new()
            .part("file", Part::bytes(audio).file_name(AUDIO_FILE_NAME))
            .text("model", model.to_string());

        let response = self
            .http
            .post(CallKind::Transcription, api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(
                "Transcription request failed with status {} [request_id: {}]",
                status, request_id
            );
            let err = map_http_error(failure_message(model), status, reason_phrase(status), None);
            return Err(err.into());
        }

        let result: OpenAITranscription = response.json().await?;
        debug!("Transcription from {}: {} [request_id: {}]", model, result.text, request_id);
        Ok(result.text)
    }

    /// Request a chat completion and return the first choice's content.
    ///
    /// When `usage_sink` is given it receives the response's usage exactly
    /// once, before this returns. It is never called on failure.
    pub async fn request_completion(
        &self,
        messages: &[ChatMessage],
        model: &str,
        api_key: &str,
        options: Option<&RequestOptions>,
        usage_sink: Option<&dyn UsageSink>,
    ) -> ClientResult<String> {
        let request_id = new_request_id();
        let request = build_chat_request(model, messages, options);
        let logged = Value::Object(request.clone());
        debug!("Request to {}: {} [request_id: {}]", model, logged, request_id);

        let response = self
            .http
            .post(CallKind::Chat, api_key)
            .json(&request)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(self.request_failed(model, response, request_id).await);
        }

        let body: Value = response.json().await?;
        debug!("Response body from {}: {} [request_id: {}]", model, body, request_id);

        let result = OpenAIResponse::deserialize(&body)?;
        if let Some(sink) = usage_sink {
            let usage = match result.usage {
                Some(usage) => usage,
                None => Usage::from_value(body.get("usage").unwrap_or(&Value::Null))?,
            };
            sink.record_usage(usage);
        }

        let choice = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::MissingChoice {
                model: model.to_string(),
            })?;
        choice.message.content.ok_or_else(|| ClientError::MissingContent {
            model: model.to_string(),
        })
    }

    /// Request a streamed chat completion.
    ///
    /// Status and content type are checked before this returns; the body is
    /// read lazily as the returned stream is polled. If `usage_sink` is
    /// given, the request asks the API to include usage in the stream and
    /// every usage frame is forwarded to the sink.
    pub async fn request_completion_stream(
        &self,
        messages: &[ChatMessage],
        model: &str,
        api_key: &str,
        options: Option<&RequestOptions>,
        usage_sink: Option<SharedUsageSink>,
    ) -> ClientResult<CompletionStream> {
        let request_id = new_request_id();
        let request = build_stream_request(model, messages, options, usage_sink.is_some());
        let logged = Value::Object(request.clone());
        debug!("Request to {}: {} [request_id: {}]", model, logged, request_id);

        let response = self
            .http
            .post(CallKind::Chat, api_key)
            .json(&request)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(self.request_failed(model, response, request_id).await);
        }

        let content_type = normalized_content_type(response.headers());
        if content_type != CONTENT_TYPE_EVENT_STREAM {
            warn!(
                "Unexpected content type {} from {} [request_id: {}]",
                content_type, model, request_id
            );
            return Err(ClientError::UnexpectedContentType { content_type });
        }

        Ok(parse_stream(response.bytes_stream(), usage_sink, request_id))
    }

    /// Turn a non-200 completion response into an error
    async fn request_failed(
        &self,
        model: &str,
        response: reqwest::Response,
        request_id: uuid::Uuid,
    ) -> ClientError {
        let status = response.status();
        warn!(
            "Request to {} failed with status {} [request_id: {}]",
            model, status, request_id
        );
        match request_error_from_response(failure_message(model), response).await {
            Ok(err) => {
                if let Some(details) = &err.details_for_logging {
                    debug!("Error body from {}: {} [request_id: {}]", model, details, request_id);
                }
                ClientError::Request(err)
            }
            Err(e) => ClientError::Transport(e),
        }
    }
}

fn failure_message(model: &str) -> String {
    format!("Request to {} failed", model)
}

#[async_trait]
impl CompletionProvider for OpenAIClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn transcribe(
        &self,
        audio: Vec<u8>,
        api_key: &str,
        model: Option<&str>,
    ) -> ClientResult<String> {
        OpenAIClient::transcribe(self, audio, api_key, model).await
    }

    async fn request_completion(
        &self,
        messages: &[ChatMessage],
        model: &str,
        api_key: &str,
        options: Option<&RequestOptions>,
        usage_sink: Option<&dyn UsageSink>,
    ) -> ClientResult<String> {
        OpenAIClient::request_completion(self, messages, model, api_key, options, usage_sink).await
    }

    async fn request_completion_stream(
        &self,
        messages: &[ChatMessage],
        model: &str,
        api_key: &str,
        options: Option<&RequestOptions>,
        usage_sink: Option<SharedUsageSink>,
    ) -> ClientResult<CompletionStream> {
        OpenAIClient::request_completion_stream(self, messages, model, api_key, options, usage_sink)
            .await
    }
}
