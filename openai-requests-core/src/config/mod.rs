//! Configuration module
//!
//! This module provides the configuration schema and validation for the
//! client: base URL, connection timeouts and default retry settings.

mod env;
mod error;
mod schema;

pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{ClientConfig, ConnectionConfig, RetrySettings, CONFIG_VERSION};

use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<ClientConfig> {
    let path = path.as_ref();
    let content = read_config(path)?;

    let config: ClientConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    finish_loading(path, config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<ClientConfig> {
    let path = path.as_ref();
    let content = read_config(path)?;

    let config: ClientConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    finish_loading(path, config)
}

/// Read a file and interpolate environment variables before parsing
fn read_config(path: &Path) -> ConfigResult<String> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    env::interpolate_env_vars(&content)
}

fn finish_loading(path: &Path, config: ClientConfig) -> ConfigResult<ClientConfig> {
    config.validate()?;
    debug!(
        "Loaded client config from {} (base_url: {})",
        path.display(),
        config.base_url
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_yaml() {
        let yaml = r#"
version: "1"
base_url: https://api.openai.com/v1
connection:
  connect_timeout_ms: 5000
  request_timeout_ms: 120000
  max_idle_per_host: 4
retry:
  max_attempts: 5
  delay_ms: 100
"#;
        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.connection.connect_timeout_ms, 5000);
        assert_eq!(config.connection.request_timeout_ms, Some(120000));
        assert_eq!(config.retry.max_attempts, 5);
        assert!(config.validate().is_ok());
    }
}
