//! iCalendar exporter
//!
//! Turns a [`CalendarInvite`] into a `VCALENDAR` with exactly one `VEVENT`.
//! Start and end are resolved in the invite's zone and written as UTC
//! instants, so no `VTIMEZONE` block is needed.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use domain::{CalendarInvite, Timezone};
use icalendar::{Calendar, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike};
use thiserror::Error;
use tracing::debug;

/// MIME type of exported documents
pub const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// `PRODID` written when none is configured
pub const DEFAULT_PRODUCT_ID: &str = "-//HR//Meeting Planner//NL";

/// iCalendar export errors
#[derive(Debug, Error)]
pub enum IcalError {
    #[error("Invalid invite: {0}")]
    InvalidInvite(String),

    /// The wall-clock time does not exist in the zone (DST gap)
    #[error("{time} does not exist in {zone}")]
    NonexistentLocalTime { time: NaiveDateTime, zone: String },
}

/// Renders invites as iCalendar text
#[derive(Debug, Clone)]
pub struct IcsExporter {
    product_id: String,
    description: Option<String>,
}

impl Default for IcsExporter {
    fn default() -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            description: None,
        }
    }
}

impl IcsExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the calendar `PRODID`
    #[must_use]
    pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
        self.product_id = product_id.into();
        self
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Add a fixed description to every event
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Render one invite
    pub fn render(&self, invite: &CalendarInvite) -> Result<String, IcalError> {
        if invite.summary.trim().is_empty() {
            return Err(IcalError::InvalidInvite("summary is empty".to_string()));
        }
        if invite.ends_at <= invite.starts_at {
            return Err(IcalError::InvalidInvite(format!(
                "event ends at {} before it starts at {}",
                invite.ends_at, invite.starts_at
            )));
        }

        let starts = to_utc(invite.starts_at, invite.timezone)?;
        let ends = to_utc(invite.ends_at, invite.timezone)?;

        let mut event = Event::new();
        event
            .uid(&invite.uid)
            .summary(&invite.summary)
            .starts(utc_time(starts))
            .ends(utc_time(ends))
            .add_property("ORGANIZER", invite.organizer.mailto_uri())
            .add_multi_property("ATTENDEE", &invite.attendee.mailto_uri());

        if let Some(description) = &self.description {
            event.description(description);
        }

        let mut calendar = Calendar::empty();
        calendar
            .append_property(("VERSION", "2.0"))
            .append_property(("PRODID", self.product_id.as_str()))
            .append_property(("CALSCALE", "GREGORIAN"))
            .push(event.done());

        debug!(uid = %invite.uid, kind = %invite.kind, "Rendered calendar invite");
        Ok(calendar.to_string())
    }

    /// Render one invite as bytes, ready to attach
    pub fn render_bytes(&self, invite: &CalendarInvite) -> Result<Vec<u8>, IcalError> {
        self.render(invite).map(String::into_bytes)
    }
}

/// Resolve a wall-clock time in `zone`; the earlier instant wins on a DST fold
fn to_utc(time: NaiveDateTime, zone: Timezone) -> Result<DateTime<Utc>, IcalError> {
    zone.tz()
        .from_local_datetime(&time)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| IcalError::NonexistentLocalTime {
            time,
            zone: zone.name().to_string(),
        })
}

const fn utc_time(instant: DateTime<Utc>) -> DatePerhapsTime {
    DatePerhapsTime::DateTime(CalendarDateTime::Utc(instant))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use domain::{EmailAddress, MeetingEvent, MeetingKind};
    use icalendar::{CalendarComponent, parser};

    use super::*;

    fn invite(title: &str) -> CalendarInvite {
        invite_at(title, 2023, 12, 4, 13)
    }

    fn invite_at(title: &str, year: i32, month: u32, day: u32, hour: u32) -> CalendarInvite {
        let meeting = MeetingEvent::new(
            MeetingKind::ContractReview,
            NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            EmailAddress::new("jan@example.nl").unwrap(),
            EmailAddress::new("hr@bedrijf.nl").unwrap(),
            title,
        );
        CalendarInvite::build(&meeting, Timezone::amsterdam(), Duration::minutes(60))
    }

    fn events(ics: &str) -> Vec<icalendar::Event> {
        let unfolded = parser::unfold(ics);
        let parsed = parser::read_calendar(&unfolded).unwrap();
        parsed
            .components
            .into_iter()
            .filter_map(|component| match CalendarComponent::from(component) {
                CalendarComponent::Event(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn renders_single_event() {
        let invite = invite("Contractbespreking");
        let ics = IcsExporter::new().render(&invite).unwrap();

        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.contains("VERSION:2.0"));
        assert!(ics.contains("DTSTAMP:"));
        let events = events(&ics);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get_uid(), Some(invite.uid.as_str()));
        assert_eq!(events[0].get_summary(), Some("Contractbespreking"));
    }

    #[test]
    fn winter_times_are_written_as_utc_instants() {
        let ics = IcsExporter::new()
            .render(&invite("Contractbespreking"))
            .unwrap();

        assert!(ics.contains("DTSTART:20231204T120000Z"));
        assert!(ics.contains("DTEND:20231204T130000Z"));
        assert!(!ics.contains("TZID="));
    }

    #[test]
    fn summer_times_use_the_summer_offset() {
        let ics = IcsExporter::new()
            .render(&invite_at("Salarisbespreking", 2024, 7, 1, 9))
            .unwrap();

        assert!(ics.contains("DTSTART:20240701T070000Z"));
        assert!(ics.contains("DTEND:20240701T080000Z"));
    }

    #[test]
    fn parsed_start_is_the_utc_instant() {
        let ics = IcsExporter::new()
            .render(&invite("Contractbespreking"))
            .unwrap();
        let expected = Utc.with_ymd_and_hms(2023, 12, 4, 12, 0, 0).unwrap();

        assert_eq!(
            events(&ics)[0].get_start(),
            Some(DatePerhapsTime::DateTime(CalendarDateTime::Utc(expected)))
        );
    }

    #[test]
    fn time_in_dst_gap_is_rejected() {
        let result = IcsExporter::new().render(&invite_at("Contractbespreking", 2024, 3, 31, 2));
        assert!(matches!(
            result,
            Err(IcalError::NonexistentLocalTime { .. })
        ));
    }

    #[test]
    fn product_id_defaults_and_can_be_set() {
        let plain = IcsExporter::new()
            .render(&invite("Contractbespreking"))
            .unwrap();
        assert!(plain.contains(&format!("PRODID:{DEFAULT_PRODUCT_ID}")));
        assert!(!plain.contains("ICALENDAR-RS"));

        let custom = IcsExporter::new()
            .with_product_id("-//Bedrijf BV//HR//NL")
            .render(&invite("Contractbespreking"))
            .unwrap();
        assert_eq!(custom.matches("PRODID:").count(), 1);
        assert!(custom.contains("PRODID:-//Bedrijf BV//HR//NL"));
        assert!(custom.contains("VERSION:2.0"));
    }

    #[test]
    fn organizer_and_attendee_are_mailto() {
        let ics = IcsExporter::new()
            .render(&invite("Contractbespreking"))
            .unwrap();
        let events = events(&ics);

        assert_eq!(
            events[0].property_value("ORGANIZER"),
            Some("mailto:hr@bedrijf.nl")
        );
        assert!(ics.contains("ATTENDEE:mailto:jan@example.nl"));
    }

    #[test]
    fn description_is_optional() {
        let plain = IcsExporter::new()
            .render(&invite("Contractbespreking"))
            .unwrap();
        assert!(!plain.contains("DESCRIPTION"));

        let described = IcsExporter::new()
            .with_description("HR bespreking")
            .render(&invite("Contractbespreking"))
            .unwrap();
        assert_eq!(
            events(&described)[0].get_description(),
            Some("HR bespreking")
        );
    }

    #[test]
    fn each_render_keeps_invite_uid() {
        let first = invite("Salarisbespreking");
        let second = invite("Salarisbespreking");
        let exporter = IcsExporter::new();

        let a = events(&exporter.render(&first).unwrap());
        let b = events(&exporter.render(&second).unwrap());
        assert_ne!(a[0].get_uid(), b[0].get_uid());
    }

    #[test]
    fn empty_summary_is_rejected() {
        let result = IcsExporter::new().render(&invite("   "));
        assert!(matches!(result, Err(IcalError::InvalidInvite(_))));
    }

    #[test]
    fn inverted_times_are_rejected() {
        let mut invite = invite("Contractbespreking");
        invite.ends_at = invite.starts_at;
        assert!(IcsExporter::new().render(&invite).is_err());
    }

    #[test]
    fn bytes_match_text() {
        let invite = invite("Contractbespreking");
        let exporter = IcsExporter::new();
        let bytes = exporter.render_bytes(&invite).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(&invite.uid));
    }
}
