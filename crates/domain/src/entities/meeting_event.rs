//! Meeting events derived from a contract

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::value_objects::EmailAddress;

/// The two meetings planned for every contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    /// Review ahead of the contract end date
    ContractReview,
    /// Review one year into the contract
    SalaryReview,
}

impl fmt::Display for MeetingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractReview => write!(f, "contract review"),
            Self::SalaryReview => write!(f, "salary review"),
        }
    }
}

/// A scheduled meeting between an employee and HR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingEvent {
    pub kind: MeetingKind,
    /// Local wall-clock start in the organisational zone
    pub starts_at: NaiveDateTime,
    pub attendee: EmailAddress,
    pub organizer: EmailAddress,
    pub title: String,
}

impl MeetingEvent {
    pub fn new(
        kind: MeetingKind,
        starts_at: NaiveDateTime,
        attendee: EmailAddress,
        organizer: EmailAddress,
        title: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            starts_at,
            attendee,
            organizer,
            title: title.into(),
        }
    }
}
