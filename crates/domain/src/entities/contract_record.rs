//! Contract record entity
//!
//! One row of a contract file, converted from its raw string fields into
//! typed values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{errors::DomainError, value_objects::EmailAddress};

/// Column titles of a contract file, in file order
pub const CONTRACT_COLUMNS: [&str; 5] = [
    "Name employee",
    "E-mail employee",
    "E-mail HR employee",
    "Start date contract",
    "Duration contract (in months)",
];

/// Day-first date format used in contract files and outgoing messages
pub const CONTRACT_DATE_FORMAT: &str = "%d-%m-%Y";

/// A single employee contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    /// Employee display name
    pub employee_name: String,
    /// Employee address, receives the invitation
    pub employee_email: EmailAddress,
    /// HR address, organizer and Cc of the invitation
    pub hr_email: EmailAddress,
    /// First day of the contract
    pub start_date: NaiveDate,
    /// Contract length in calendar months
    pub duration_months: u32,
}

impl ContractRecord {
    /// Convert the fields of one row, in [`CONTRACT_COLUMNS`] order
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, DomainError> {
        let [name, employee_email, hr_email, start_date, duration] = fields else {
            return Err(DomainError::MalformedRow(format!(
                "expected {} fields, found {}",
                CONTRACT_COLUMNS.len(),
                fields.len()
            )));
        };

        Ok(Self {
            employee_name: name.as_ref().trim().to_string(),
            employee_email: EmailAddress::new(employee_email.as_ref())?,
            hr_email: EmailAddress::new(hr_email.as_ref())?,
            start_date: parse_contract_date(start_date.as_ref())?,
            duration_months: parse_duration_months(duration.as_ref())?,
        })
    }
}

/// Parse a `DD-MM-YYYY` date
pub fn parse_contract_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), CONTRACT_DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(value.to_string()))
}

/// Parse a non-negative number of months
pub fn parse_duration_months(value: &str) -> Result<u32, DomainError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| DomainError::InvalidDuration(value.to_string()))
}
