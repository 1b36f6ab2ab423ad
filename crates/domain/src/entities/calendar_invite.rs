//! Calendar invite payload
//!
//! Everything needed to serialize one meeting as a single-event calendar
//! object. Serialization itself lives in `integration_ical`.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::meeting_event::{MeetingEvent, MeetingKind};
use crate::value_objects::{EmailAddress, Timezone};

/// A single calendar event ready for export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInvite {
    /// Globally unique event identifier, fresh for every invite
    pub uid: String,
    pub kind: MeetingKind,
    pub summary: String,
    /// Local start in `timezone`
    pub starts_at: NaiveDateTime,
    /// Local end in `timezone`
    pub ends_at: NaiveDateTime,
    pub timezone: Timezone,
    pub attendee: EmailAddress,
    pub organizer: EmailAddress,
}

impl CalendarInvite {
    /// Build the invite for a meeting
    ///
    /// Every call produces a new uid, so two invites for the same attendee and
    /// slot are still distinct events for the receiving calendar.
    pub fn build(meeting: &MeetingEvent, timezone: Timezone, length: Duration) -> Self {
        Self {
            uid: Self::generate_uid(meeting),
            kind: meeting.kind,
            summary: meeting.title.clone(),
            starts_at: meeting.starts_at,
            ends_at: meeting.starts_at + length,
            timezone,
            attendee: meeting.attendee.clone(),
            organizer: meeting.organizer.clone(),
        }
    }

    /// File name used when the invite is attached to a message
    pub fn attachment_filename(&self) -> String {
        let stem: String = self
            .summary
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '"') { '_' } else { c })
            .collect();
        format!("{stem}.ics")
    }

    fn generate_uid(meeting: &MeetingEvent) -> String {
        let domain = match meeting.organizer.domain() {
            "" => "localhost",
            domain => domain,
        };
        format!(
            "{}-{}@{domain}",
            Uuid::new_v4(),
            meeting.starts_at.format("%Y%m%dT%H%M%S")
        )
    }
}
