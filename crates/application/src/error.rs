//! Application-level errors
//!
//! The variants mirror how far a failure reaches during a batch run:
//! configuration problems stop the run, malformed files and dispatch
//! failures stop a single file, invalid dates skip a single row.

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Missing input directory or invalid settings; aborts the whole run
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// File cannot be read as a contract table; aborts that file
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Row date could not be parsed or derived; skips that row
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Invitation could not be built or delivered; the file stays unprocessed
    #[error("Dispatch failed: {0}")]
    DispatchFailure(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Whether the whole batch has to stop
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Whether only the current row is affected
    pub fn is_row_local(&self) -> bool {
        match self {
            Self::InvalidDate(_) => true,
            Self::Domain(e) => e.is_row_local(),
            _ => false,
        }
    }

    /// Re-label any error raised while building or sending invitations
    #[must_use]
    pub fn into_dispatch_failure(self) -> Self {
        match self {
            Self::DispatchFailure(_) => self,
            other => Self::DispatchFailure(other.to_string()),
        }
    }
}
