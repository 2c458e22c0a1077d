//! Error severity model shared across fieldkit crates
//!
//! Each crate defines its own `thiserror` enum; this module only provides the
//! vocabulary used to classify those errors and a formatter for printing a
//! full `source()` chain.

use std::fmt;

/// Severity levels for error classification
///
/// - **Warning**: the operation was refused but nothing is wrong with the
///   system, e.g. a schema save rejected by validation.
/// - **Error**: the operation failed but the system can continue, e.g. a
///   stored value that could not be decoded.
/// - **Critical**: the system cannot continue, e.g. the backing store is
///   unreachable.
///
/// # Examples
///
/// ```rust
/// use fieldkit_common::ErrorSeverity;
///
/// let rejected_schema = ErrorSeverity::Warning;
/// let unreadable_store = ErrorSeverity::Critical;
/// assert_ne!(rejected_schema, unreadable_store);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// The request was refused; the caller can correct it and retry
    Warning,

    /// Operation failed but the system can continue
    Error,

    /// System cannot continue, requires immediate attention
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Trait for error types that have severity levels
///
/// ```rust
/// use fieldkit_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum StoreError {
///     Unreachable,
///     Corrupt,
/// }
///
/// impl Severity for StoreError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             StoreError::Unreachable => ErrorSeverity::Critical,
///             StoreError::Corrupt => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert_eq!(StoreError::Corrupt.severity(), ErrorSeverity::Error);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

/// Error chain formatter for detailed error reporting
pub struct ErrorChain<'a>(&'a dyn std::error::Error);

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: {}", self.0)?;

        let mut current = self.0.source();
        let mut level = 1;

        while let Some(err) = current {
            writeln!(f, "{:indent$}Caused by: {}", "", err, indent = level * 2)?;
            current = err.source();
            level += 1;
        }

        Ok(())
    }
}

/// Extension trait for error types to format the full error chain
pub trait ErrorChainExt {
    /// Format the full error chain
    fn error_chain(&self) -> ErrorChain<'_>;
}

impl<E: std::error::Error> ErrorChainExt for E {
    fn error_chain(&self) -> ErrorChain<'_> {
        ErrorChain(self)
    }
}
