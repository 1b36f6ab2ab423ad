//! SMTP integration
//!
//! Sends HTML messages with calendar attachments over SMTP.
//! Supports implicit TLS, STARTTLS and plain connections with AUTH PLAIN.

pub mod client;
pub mod message;
pub mod smtp_client;
pub mod tls;

pub use client::{SmtpConfig, SmtpError, SmtpSecurity, TlsConfig};
pub use message::{Attachment, EmailComposition};
pub use smtp_client::SmtpClient;
