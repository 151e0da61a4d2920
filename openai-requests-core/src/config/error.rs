//! Errors raised while loading a configuration file

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure to turn a file into a valid [`ClientConfig`](super::ClientConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in '{path}' at line {}, column {}: {message}",
            .line.unwrap_or(0), .column.unwrap_or(0))]
    ParseError {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Environment variable '{var}' not found")]
    EnvVarNotFound { var: String },

    #[error("Placeholder pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

/// A field that holds an unusable value
#[derive(Debug, Error)]
#[error("'{field_path}' {kind}")]
pub struct ValidationError {
    /// Dotted path of the field, e.g. `retry.max_attempts`
    pub field_path: String,
    pub kind: ValidationErrorKind,
}

/// What is wrong with the field
#[derive(Debug, Error)]
pub enum ValidationErrorKind {
    #[error("is required")]
    RequiredFieldMissing,

    #[error("is out of range: {message}")]
    OutOfRange { message: String },

    #[error("is not a usable URL: {message}")]
    InvalidUrl { message: String },

    #[error("has unsupported version {actual}, expected {expected}")]
    InvalidVersion { expected: String, actual: String },
}

impl ValidationError {
    pub fn new(field_path: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self {
            field_path: field_path.into(),
            kind,
        }
    }

    pub fn required(field_path: impl Into<String>) -> Self {
        Self::new(field_path, ValidationErrorKind::RequiredFieldMissing)
    }

    pub fn out_of_range(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::OutOfRange {
                message: message.into(),
            },
        )
    }

    pub fn invalid_url(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            field_path,
            ValidationErrorKind::InvalidUrl {
                message: message.into(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::out_of_range("retry.max_attempts", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "'retry.max_attempts' is out of range: must be at least 1"
        );

        let err = ConfigError::from(ValidationError::required("base_url"));
        assert_eq!(err.to_string(), "Invalid configuration: 'base_url' is required");
    }
}
