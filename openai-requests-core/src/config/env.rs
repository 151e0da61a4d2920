//! Environment variable interpolation for configuration

use super::error::ConfigError;
use regex::Regex;
use std::env;

/// A `${VAR}` placeholder; names are upper case
const PLACEHOLDER: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

/// Interpolate environment variables in a configuration string
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let pattern = Regex::new(PLACEHOLDER)?;
    let mut missing_vars = Vec::new();

    let result = pattern.replace_all(content, |cap: &regex::Captures<'_>| {
        match env::var(&cap[1]) {
            Ok(value) => value,
            Err(_) => {
                missing_vars.push(cap[1].to_string());
                String::new()
            }
        }
    });

    // Report the first missing variable
    if let Some(var) = missing_vars.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound { var });
    }

    Ok(result.into_owned())
}
