//! Calendar export port
//!
//! Serializes a calendar invite into an attachable document.

#[cfg(test)]
use mockall::automock;
use domain::CalendarInvite;

use crate::error::ApplicationError;

/// A document attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarAttachment {
    pub filename: String,
    /// MIME type including parameters
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Port for calendar serialization
#[cfg_attr(test, automock)]
pub trait CalendarExportPort: Send + Sync {
    /// Serialize a single-event calendar
    fn export(&self, invite: &CalendarInvite) -> Result<CalendarAttachment, ApplicationError>;
}
