//! Error handling for the fieldkit CLI
//!
//! Commands return `anyhow::Result`; failures are turned into a [`CliError`]
//! carrying the exit code, chosen from the severity of the underlying
//! engine error when there is one.

use std::error::Error;
use std::fmt;

use fieldkit_common::{ErrorSeverity, Severity};
use fieldkit_config::ConfigError;
use fieldkit_fields::FieldsError;

use crate::exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_WARNING};

/// CLI-specific result type that preserves error information
pub type CliResult<T> = Result<T, CliError>;

/// CLI error type that includes both error information and suggested exit code
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: i32,
    pub source: Option<Box<dyn Error + Send + Sync>>,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: i32) -> Self {
        Self {
            message: message.into(),
            exit_code,
            source: None,
        }
    }

    /// Get the full error chain as a formatted string
    pub fn full_chain(&self) -> String {
        let mut result = self.message.clone();

        let mut current_source = self.source();
        while let Some(err) = current_source {
            let text = err.to_string();
            if text != self.message {
                result.push_str(&format!("\n  Caused by: {text}"));
            }
            current_source = err.source();
        }

        result
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        let exit_code = match severity_of(&error) {
            Some(ErrorSeverity::Warning) => EXIT_WARNING,
            _ => EXIT_ERROR,
        };
        Self {
            message: error.to_string(),
            exit_code,
            source: Some(error.into()),
        }
    }
}

/// Severity of the first engine or configuration error in the chain
fn severity_of(error: &anyhow::Error) -> Option<ErrorSeverity> {
    error.chain().find_map(|cause| {
        cause
            .downcast_ref::<FieldsError>()
            .map(Severity::severity)
            .or_else(|| cause.downcast_ref::<ConfigError>().map(Severity::severity))
    })
}

/// Convert a CliResult to an exit code, printing the full error chain if needed
pub fn handle_cli_result<T>(result: CliResult<T>) -> i32 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => {
            tracing::error!("Error: {}", e.full_chain());
            e.exit_code
        }
    }
}
