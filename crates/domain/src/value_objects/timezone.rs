//! Timezone value object

use std::{fmt, str::FromStr};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// The organisational time zone meetings are scheduled in
///
/// Wraps a validated IANA zone so invalid names are rejected when the
/// configuration is loaded rather than when the first invite is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timezone(Tz);

impl Timezone {
    /// Parse an IANA time zone name
    pub fn new(name: &str) -> Result<Self, DomainError> {
        Tz::from_str(name.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
    }

    /// IANA name, used as the iCalendar `TZID`
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Underlying chrono-tz zone
    #[must_use]
    pub const fn tz(&self) -> Tz {
        self.0
    }

    /// Europe/Amsterdam, the default organisational zone
    #[must_use]
    pub const fn amsterdam() -> Self {
        Self(Tz::Europe__Amsterdam)
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::amsterdam()
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<String> for Timezone {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Timezone> for String {
    fn from(tz: Timezone) -> Self {
        tz.name().to_string()
    }
}
