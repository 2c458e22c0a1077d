//! Error types for the fieldkit configuration system

use fieldkit_common::{ErrorSeverity, Severity};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicitly requested configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration file has an extension no provider understands
    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ValidationError { message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

impl Severity for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ConfigError::FileNotFound { .. } => ErrorSeverity::Error,
            ConfigError::UnsupportedFormat { .. } => ErrorSeverity::Error,
            ConfigError::InvalidValue { .. } => ErrorSeverity::Error,
            ConfigError::ValidationError { .. } => ErrorSeverity::Error,
            ConfigError::ParseError { .. } => ErrorSeverity::Critical,
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::invalid_value("store.key_prefix", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for key 'store.key_prefix': must not be empty"
        );
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    #[test]
    fn test_parse_error_is_critical() {
        let err = ConfigError::from(figment::Error::from("bad".to_string()));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.to_string().starts_with("Failed to parse configuration"));
    }
}
