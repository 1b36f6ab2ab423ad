//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod calendar_export_port;
mod confirmation_port;
mod contract_source_port;
mod notification_port;

#[cfg(test)]
pub use calendar_export_port::MockCalendarExportPort;
pub use calendar_export_port::{CalendarAttachment, CalendarExportPort};
#[cfg(test)]
pub use confirmation_port::MockConfirmationPort;
pub use confirmation_port::ConfirmationPort;
#[cfg(test)]
pub use contract_source_port::MockContractSourcePort;
pub use contract_source_port::{ContractSourcePort, InputUnit, ParsedRow, ParsedUnit};
#[cfg(test)]
pub use notification_port::MockNotificationPort;
pub use notification_port::{MeetingNotification, NotificationPort};
