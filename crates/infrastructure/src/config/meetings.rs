//! Meeting planning configuration

use application::MeetingSettings;
use chrono::Duration;
use domain::{DomainError, ScheduleRules, Timezone};
use integration_ical::IcsExporter;
use serde::{Deserialize, Serialize};

/// Titles, time zone and scheduling rules for planned meetings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingsConfig {
    /// IANA time zone of the organisation
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Title of the contract review invite
    #[serde(default = "default_contract_title")]
    pub contract_title: String,

    /// Title of the salary review invite
    #[serde(default = "default_salary_title")]
    pub salary_title: String,

    /// Subject of the invitation message
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Meeting length in minutes
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,

    /// Weeks before the contract end the review is anchored
    #[serde(default = "default_review_lead_weeks")]
    pub review_lead_weeks: u32,

    /// Months after the contract start for the salary review
    #[serde(default = "default_salary_review_months")]
    pub salary_review_months: u32,

    /// Earliest meeting hour (inclusive)
    #[serde(default = "default_first_hour")]
    pub first_hour: u32,

    /// Latest meeting hour (inclusive)
    #[serde(default = "default_last_hour")]
    pub last_hour: u32,

    /// `PRODID` of exported calendar documents
    #[serde(default = "default_product_id")]
    pub product_id: String,
}

fn default_timezone() -> String {
    "Europe/Amsterdam".to_string()
}

fn default_contract_title() -> String {
    "Contractbespreking".to_string()
}

fn default_salary_title() -> String {
    "Salarisbespreking".to_string()
}

fn default_subject() -> String {
    "HR bespreking".to_string()
}

const fn default_duration_minutes() -> u32 {
    60
}

const fn default_review_lead_weeks() -> u32 {
    5
}

const fn default_salary_review_months() -> u32 {
    12
}

const fn default_first_hour() -> u32 {
    9
}

const fn default_last_hour() -> u32 {
    17
}

fn default_product_id() -> String {
    integration_ical::DEFAULT_PRODUCT_ID.to_string()
}

impl Default for MeetingsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            contract_title: default_contract_title(),
            salary_title: default_salary_title(),
            subject: default_subject(),
            duration_minutes: default_duration_minutes(),
            review_lead_weeks: default_review_lead_weeks(),
            salary_review_months: default_salary_review_months(),
            first_hour: default_first_hour(),
            last_hour: default_last_hour(),
            product_id: default_product_id(),
        }
    }
}

impl MeetingsConfig {
    /// Scheduling rules for the schedule engine
    pub const fn schedule_rules(&self) -> ScheduleRules {
        ScheduleRules {
            review_lead_weeks: self.review_lead_weeks,
            salary_review_months: self.salary_review_months,
            first_hour: self.first_hour,
            last_hour: self.last_hour,
        }
    }

    /// Exporter writing invites with the configured `PRODID`
    pub fn ics_exporter(&self) -> IcsExporter {
        IcsExporter::new().with_product_id(self.product_id.trim())
    }

    /// Titles, zone and length used by the batch service
    pub fn meeting_settings(&self) -> Result<MeetingSettings, DomainError> {
        Ok(MeetingSettings {
            contract_title: self.contract_title.clone(),
            salary_title: self.salary_title.clone(),
            timezone: Timezone::new(&self.timezone)?,
            meeting_length: Duration::minutes(i64::from(self.duration_minutes)),
        })
    }

    /// Check zone, hour window, titles and length
    pub fn validate(&self) -> Result<(), DomainError> {
        Timezone::new(&self.timezone)?;
        self.schedule_rules().validate()?;
        if self.duration_minutes == 0 {
            return Err(DomainError::ValidationError(
                "meeting duration must be at least one minute".to_string(),
            ));
        }
        if self.contract_title.trim().is_empty() || self.salary_title.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "meeting titles must not be empty".to_string(),
            ));
        }
        if self.product_id.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "calendar product id must not be empty".to_string(),
            ));
        }
        if self.subject.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "message subject must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
