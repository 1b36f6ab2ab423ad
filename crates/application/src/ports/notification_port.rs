//! Notification port
//!
//! Delivers the planned meetings of one employee.

use async_trait::async_trait;
use chrono::NaiveDateTime;
#[cfg(test)]
use mockall::automock;
use domain::EmailAddress;

use super::calendar_export_port::CalendarAttachment;
use crate::error::ApplicationError;

/// Everything one outgoing invitation message carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingNotification {
    pub employee_name: String,
    /// Employee address
    pub to: EmailAddress,
    /// HR address
    pub cc: EmailAddress,
    pub contract_title: String,
    pub contract_meeting: NaiveDateTime,
    pub salary_title: String,
    pub salary_meeting: NaiveDateTime,
    /// One calendar document per meeting
    pub attachments: Vec<CalendarAttachment>,
}

/// Port for invitation delivery
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationPort: Send + Sync {
    /// Send one message; errors are reported as dispatch failures
    async fn notify(&self, notification: &MeetingNotification) -> Result<(), ApplicationError>;

    /// Check that the delivery channel is reachable
    async fn is_available(&self) -> bool;
}
