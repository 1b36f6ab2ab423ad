//! SMTP notification adapter - Implements NotificationPort using integration_smtp

use application::{
    error::ApplicationError,
    ports::{MeetingNotification, NotificationPort},
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use domain::CONTRACT_DATE_FORMAT;
use integration_smtp::{Attachment, EmailComposition, SmtpClient, SmtpConfig, SmtpError};
use tracing::{debug, instrument};

use crate::templates::{PlannedMeetingData, TemplateEngine, TemplateError};

/// Default subject of invitation messages
pub const DEFAULT_SUBJECT: &str = "HR bespreking";

/// Sends one HTML message per employee with both invites attached
#[derive(Debug)]
pub struct SmtpNotificationAdapter {
    client: SmtpClient,
    templates: TemplateEngine,
    subject: String,
}

impl SmtpNotificationAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: SmtpConfig, templates: TemplateEngine) -> Self {
        Self {
            client: SmtpClient::new(config),
            templates,
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Build the message for one employee
    pub fn compose(
        &self,
        notification: &MeetingNotification,
    ) -> Result<EmailComposition, ApplicationError> {
        let body = self
            .templates
            .render_planned_meeting(&PlannedMeetingData {
                name: notification.employee_name.clone(),
                contract_title: notification.contract_title.clone(),
                contract_meeting_date: format_slot(notification.contract_meeting),
                salary_title: notification.salary_title.clone(),
                salary_meeting_date: format_slot(notification.salary_meeting),
            })
            .map_err(Self::map_template_error)?;

        let composition = notification.attachments.iter().fold(
            EmailComposition::new(notification.to.as_str(), &self.subject, body)
                .with_cc(notification.cc.as_str()),
            |composition, attachment| {
                composition.with_attachment(Attachment::new(
                    &attachment.filename,
                    &attachment.content_type,
                    attachment.data.clone(),
                ))
            },
        );
        Ok(composition)
    }

    fn map_error(e: SmtpError) -> ApplicationError {
        ApplicationError::DispatchFailure(format!("SMTP: {e}"))
    }

    fn map_template_error(e: TemplateError) -> ApplicationError {
        ApplicationError::DispatchFailure(format!("message body: {e}"))
    }
}

/// `DD-MM-YYYY HH:MM`
fn format_slot(slot: NaiveDateTime) -> String {
    slot.format(&format!("{CONTRACT_DATE_FORMAT} %H:%M"))
        .to_string()
}

#[async_trait]
impl NotificationPort for SmtpNotificationAdapter {
    #[instrument(skip(self, notification), fields(to = %notification.to.as_str()))]
    async fn notify(&self, notification: &MeetingNotification) -> Result<(), ApplicationError> {
        let composition = self.compose(notification)?;
        let message_id = self
            .client
            .send_email(&composition)
            .await
            .map_err(Self::map_error)?;

        debug!(message_id = %message_id, "Invitation sent");
        Ok(())
    }

    async fn is_available(&self) -> bool {
        self.client.check_connection().await.unwrap_or(false)
    }
}
