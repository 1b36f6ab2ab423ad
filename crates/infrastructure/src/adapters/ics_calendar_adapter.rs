//! iCalendar adapter - Implements CalendarExportPort using integration_ical

use application::{
    error::ApplicationError,
    ports::{CalendarAttachment, CalendarExportPort},
};
use domain::CalendarInvite;
use integration_ical::{ICS_CONTENT_TYPE, IcalError, IcsExporter};
use tracing::debug;

/// Renders invites as `.ics` attachments
#[derive(Debug, Clone, Default)]
pub struct IcsCalendarAdapter {
    exporter: IcsExporter,
}

impl IcsCalendarAdapter {
    pub fn new(exporter: IcsExporter) -> Self {
        Self { exporter }
    }

    fn map_error(e: IcalError) -> ApplicationError {
        ApplicationError::DispatchFailure(format!("calendar export: {e}"))
    }
}

impl CalendarExportPort for IcsCalendarAdapter {
    fn export(&self, invite: &CalendarInvite) -> Result<CalendarAttachment, ApplicationError> {
        let data = self
            .exporter
            .render_bytes(invite)
            .map_err(Self::map_error)?;
        debug!(uid = %invite.uid, bytes = data.len(), "Exported calendar invite");

        Ok(CalendarAttachment {
            filename: invite.attachment_filename(),
            content_type: ICS_CONTENT_TYPE.to_string(),
            data,
        })
    }
}
