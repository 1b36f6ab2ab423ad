//! Email address value object with validation
//!
//! Employee and HR addresses read from contract files are validated once,
//! when the row is converted into a [`ContractRecord`](crate::ContractRecord).
//!
//! # Examples
//!
//! ```
//! use domain::EmailAddress;
//!
//! let email = EmailAddress::new("HR@Example.COM").unwrap();
//! assert_eq!(email.as_str(), "hr@example.com");
//! assert_eq!(email.mailto_uri(), "mailto:hr@example.com");
//!
//! assert!(EmailAddress::new("invalid").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::DomainError;

/// A validated, lower-cased email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
#[serde(transparent)]
pub struct EmailAddress {
    #[validate(email)]
    value: String,
}

impl EmailAddress {
    /// Create a new email address, validating the format
    ///
    /// Surrounding whitespace is trimmed and the address is lower-cased.
    pub fn new(email: impl Into<String>) -> Result<Self, DomainError> {
        let raw = email.into();
        let candidate = Self {
            value: raw.trim().to_lowercase(),
        };
        candidate
            .validate()
            .map_err(|_| DomainError::InvalidEmailAddress(raw))?;

        Ok(candidate)
    }

    /// Get the email address as a string slice
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get the domain part (after @)
    pub fn domain(&self) -> &str {
        self.value.split('@').nth(1).unwrap_or("")
    }

    /// `mailto:` URI as used by iCalendar ORGANIZER/ATTENDEE properties
    pub fn mailto_uri(&self) -> String {
        format!("mailto:{}", self.value)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
