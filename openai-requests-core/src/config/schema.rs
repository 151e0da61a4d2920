//! Configuration schema structures with serde support

use super::error::{ValidationError, ValidationErrorKind};
use serde::{Deserialize, Serialize};

/// Supported configuration schema version
pub const CONFIG_VERSION: &str = "1";

/// Root configuration structure for the client
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Schema version (required - no default)
    pub version: String,

    /// Base URL for the API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Default retry settings
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Connection timeout (milliseconds)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Whole-request timeout (milliseconds); unset means no limit, which
    /// long streamed answers need
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Maximum idle connections kept per host
    #[serde(default = "default_max_idle")]
    pub max_idle_per_host: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: None,
            max_idle_per_host: default_max_idle(),
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    /// Total attempts, including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed pause between attempts (milliseconds)
    #[serde(default = "default_retry_delay")]
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_retry_delay(),
        }
    }
}

fn default_base_url() -> String { crate::http::client::DEFAULT_BASE_URL.to_string() }
fn default_connect_timeout() -> u64 { 10000 }
fn default_max_idle() -> usize { 10 }
fn default_max_attempts() -> u32 { 3 }
fn default_retry_delay() -> u64 { 300 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            base_url: default_base_url(),
            connection: ConnectionConfig::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl ClientConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version.is_empty() {
            return Err(ValidationError::required("version"));
        }

        if self.version != CONFIG_VERSION {
            return Err(ValidationError::new(
                "version",
                ValidationErrorKind::InvalidVersion {
                    expected: CONFIG_VERSION.to_string(),
                    actual: self.version.clone(),
                },
            ));
        }

        if self.base_url.is_empty() {
            return Err(ValidationError::required("base_url"));
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(ValidationError::invalid_url(
                        "base_url",
                        format!("scheme must be http or https, got {}", url.scheme()),
                    ));
                }
            }
            Err(e) => {
                return Err(ValidationError::invalid_url("base_url", e.to_string()));
            }
        }

        self.connection.validate("connection")?;
        self.retry.validate("retry")?;

        Ok(())
    }
}

impl ConnectionConfig {
    /// Validate connection configuration
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.connect_timeout_ms == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.connect_timeout_ms", path),
                "Must be greater than 0",
            ));
        }

        if self.request_timeout_ms == Some(0) {
            return Err(ValidationError::out_of_range(
                format!("{}.request_timeout_ms", path),
                "Must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl RetrySettings {
    /// Validate retry settings
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.max_attempts == 0 {
            return Err(ValidationError::out_of_range(
                format!("{}.max_attempts", path),
                "Must be at least 1",
            ));
        }

        Ok(())
    }
}
