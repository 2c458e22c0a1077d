//! # fieldkit common
//!
//! Foundational pieces shared by every fieldkit crate:
//!
//! - [`error`] - the severity model all error types report through, plus
//!   error-chain formatting for user-facing output
//! - [`logging`] - helpers for rendering structured values inside tracing lines
//!
//! Domain errors live in their own crates and implement [`Severity`] so the
//! CLI can pick exit codes and log levels consistently.

pub mod error;
pub mod logging;

pub use error::{ErrorChain, ErrorChainExt, ErrorSeverity, Severity};
pub use logging::Pretty;
