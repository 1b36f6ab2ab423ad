//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod filesystem_contract_source;
mod ics_calendar_adapter;
mod rng_random_source;
mod smtp_notification_adapter;

pub use filesystem_contract_source::{FilesystemContractSource, parse_unit};
pub use ics_calendar_adapter::IcsCalendarAdapter;
pub use rng_random_source::StdRandomSource;
pub use smtp_notification_adapter::{DEFAULT_SUBJECT, SmtpNotificationAdapter};
