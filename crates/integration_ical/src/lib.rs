//! iCalendar integration
//!
//! Renders meeting invites as single-event iCalendar documents.

pub mod exporter;

pub use exporter::{DEFAULT_PRODUCT_ID, ICS_CONTENT_TYPE, IcalError, IcsExporter};
