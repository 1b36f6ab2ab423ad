//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports: contract files on disk, calendar
//! export, SMTP delivery and the random source used for scheduling. Also
//! holds configuration loading and message templates.

pub mod adapters;
pub mod config;
pub mod tabular;
pub mod templates;

pub use adapters::*;
pub use config::{AppConfig, InputConfig, MeetingsConfig, SmtpAppConfig, SmtpTlsAppConfig};
pub use tabular::{RawRow, TabularError, TabularReader, detect};
pub use templates::{PlannedMeetingData, TemplateConfig, TemplateEngine, TemplateError};
