//! HTTP client implementation using reqwest

use crate::config::ConnectionConfig;
use crate::error::{ClientError, ClientResult};
use crate::http::CallKind;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use std::time::Duration;

/// Default base URL of the OpenAI API
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default user agent
const USER_AGENT: &str = concat!("openai-requests/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client. Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: Client,

    /// API base URL without trailing slash
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> ClientResult<Self> {
        Self::with_config(DEFAULT_BASE_URL, &ConnectionConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(base_url: &str, connection: &ConnectionConfig) -> ClientResult<Self> {
        // No overall timeout by default: a streamed answer may legitimately
        // stay open for minutes.
        let mut builder = ClientBuilder::new()
            .pool_max_idle_per_host(connection.max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_millis(connection.connect_timeout_ms))
            .user_agent(USER_AGENT)
            .gzip(true);
        if let Some(timeout_ms) = connection.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for a call kind
    pub fn url(&self, call_kind: CallKind) -> String {
        format!("{}{}", self.base_url, call_kind.endpoint())
    }

    /// Start a bearer-authorized POST to the endpoint of `call_kind`
    pub fn post(&self, call_kind: CallKind, api_key: &str) -> RequestBuilder {
        self.client
            .post(self.url(call_kind))
            .bearer_auth(api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            client.url(CallKind::Chat),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client =
            HttpClient::with_config("http://localhost:8080/v1/", &ConnectionConfig::default())
                .unwrap();
        assert_eq!(
            client.url(CallKind::Transcription),
            "http://localhost:8080/v1/audio/transcriptions"
        );
    }
}
