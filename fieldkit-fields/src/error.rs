//! Error types for the fields engine
//!
//! Validation outcomes and sanitization degradations are not errors; they are
//! reported through [`crate::ValidationResult`] and debug logs. This enum only
//! covers store access and unreadable persisted data.

use fieldkit_common::{ErrorSeverity, Severity};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur while persisting or reading structured content
#[derive(Debug, Error)]
pub enum FieldsError {
    /// A schema save was refused by validation
    #[error("schema rejected: {message}")]
    SchemaRejected { message: String },

    /// A persisted value exists but does not have the expected shape
    #[error("stored value under '{key}' is unreadable: {message}")]
    CorruptValue { key: String, message: String },

    /// Submitted values are not a map of field names
    #[error("invalid values: {message}")]
    InvalidValues { message: String },

    /// The document has no template binding
    #[error("document '{document}' is not bound to a template")]
    UnboundDocument { document: String },

    /// Store root directory is missing or not a directory
    #[error("store directory not found: {path}")]
    NotInitialized { path: PathBuf },

    /// Storage backend error
    #[error("storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON conversion error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FieldsError {
    /// Create a corrupt value error for the given store key
    pub fn corrupt(key: impl Into<String>, message: impl ToString) -> Self {
        FieldsError::CorruptValue {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Check if this error is a refused schema save
    pub fn is_rejection(&self) -> bool {
        matches!(self, FieldsError::SchemaRejected { .. })
    }
}

impl Severity for FieldsError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            FieldsError::SchemaRejected { .. } => ErrorSeverity::Warning,
            FieldsError::UnboundDocument { .. } => ErrorSeverity::Warning,
            FieldsError::InvalidValues { .. } => ErrorSeverity::Warning,

            FieldsError::CorruptValue { .. } => ErrorSeverity::Error,
            FieldsError::Yaml(_) => ErrorSeverity::Error,
            FieldsError::Json(_) => ErrorSeverity::Error,

            FieldsError::NotInitialized { .. } => ErrorSeverity::Critical,
            FieldsError::Storage(_) => ErrorSeverity::Critical,
            FieldsError::Io(_) => ErrorSeverity::Critical,
        }
    }
}
