//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid email address format
    #[error("Invalid email address: {0}")]
    InvalidEmailAddress(String),

    /// Date could not be parsed or date arithmetic left the supported range
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Contract duration is not a non-negative number of months
    #[error("Invalid contract duration: {0}")]
    InvalidDuration(String),

    /// Unknown IANA time zone
    #[error("Invalid time zone: {0}")]
    InvalidTimezone(String),

    /// Structural problem with a contract row
    #[error("Malformed contract row: {0}")]
    MalformedRow(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Whether this error only invalidates a single row of a unit
    ///
    /// An unusable address is not: the row cannot be delivered, so the unit
    /// has to stay unprocessed until the address is corrected.
    pub const fn is_row_local(&self) -> bool {
        matches!(self, Self::InvalidDate(_) | Self::InvalidDuration(_))
    }
}
