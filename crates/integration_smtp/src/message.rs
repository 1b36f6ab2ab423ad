//! Message composition and MIME rendering

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::SmtpError;

/// Width of base64 lines in attachment bodies
const BASE64_LINE_WIDTH: usize = 76;

/// A file attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    /// MIME type including parameters, e.g. `text/calendar; charset=utf-8`
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }
}

/// Email composition for sending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailComposition {
    /// Recipient email address
    pub to: String,
    /// Carbon copy recipients
    pub cc: Vec<String>,
    /// Email subject
    pub subject: String,
    /// HTML body
    pub html_body: String,
    pub attachments: Vec<Attachment>,
}

impl EmailComposition {
    /// Creates a new email composition
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            cc: Vec::new(),
            subject: subject.into(),
            html_body: html_body.into(),
            attachments: Vec::new(),
        }
    }

    /// Adds a CC recipient
    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    /// Adds an attachment
    #[must_use]
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// All envelope recipients, primary first
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.to.as_str()).chain(self.cc.iter().map(String::as_str))
    }

    /// Validates the composition
    pub fn validate(&self) -> Result<(), SmtpError> {
        if self.to.is_empty() || !self.to.contains('@') {
            return Err(SmtpError::InvalidAddress(format!(
                "Invalid recipient: {}",
                self.to
            )));
        }
        for cc in &self.cc {
            if cc.is_empty() || !cc.contains('@') {
                return Err(SmtpError::InvalidAddress(format!("Invalid CC: {cc}")));
            }
        }
        if self.subject.is_empty() {
            return Err(SmtpError::InvalidMessage(
                "Subject is required".to_string(),
            ));
        }
        if let Some(bad) = self
            .attachments
            .iter()
            .find(|a| a.filename.is_empty() || a.filename.contains(['"', '\r', '\n']))
        {
            return Err(SmtpError::InvalidMessage(format!(
                "Invalid attachment name: {:?}",
                bad.filename
            )));
        }
        Ok(())
    }

    /// Render the message in RFC 5322 format
    ///
    /// Without attachments the message is a single HTML part, otherwise a
    /// `multipart/mixed` with the HTML part first.
    pub fn to_mime(&self, from: &str, message_id: &str, date: &str, boundary: &str) -> String {
        let mut out = format!(
            "From: {from}\r\n\
             To: {}\r\n",
            self.to
        );
        if !self.cc.is_empty() {
            out.push_str(&format!("Cc: {}\r\n", self.cc.join(", ")));
        }
        out.push_str(&format!(
            "Subject: {}\r\n\
             Date: {date}\r\n\
             Message-ID: {message_id}\r\n\
             MIME-Version: 1.0\r\n",
            encode_header(&self.subject)
        ));

        let body = normalize_line_endings(&self.html_body);

        if self.attachments.is_empty() {
            out.push_str(
                "Content-Type: text/html; charset=utf-8\r\n\
                 Content-Transfer-Encoding: 8bit\r\n\r\n",
            );
            out.push_str(&body);
            return out;
        }

        out.push_str(&format!(
            "Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n\
             --{boundary}\r\n\
             Content-Type: text/html; charset=utf-8\r\n\
             Content-Transfer-Encoding: 8bit\r\n\r\n\
             {body}\r\n"
        ));

        for attachment in &self.attachments {
            out.push_str(&format!(
                "--{boundary}\r\n\
                 Content-Type: {}; name=\"{name}\"\r\n\
                 Content-Transfer-Encoding: base64\r\n\
                 Content-Disposition: attachment; filename=\"{name}\"\r\n\r\n\
                 {}\r\n",
                attachment.content_type,
                wrap_base64(&attachment.data),
                name = attachment.filename,
            ));
        }

        out.push_str(&format!("--{boundary}--\r\n"));
        out
    }
}

/// Formats a mailbox with an optional display name
pub fn format_mailbox(address: &str, name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => format!("{} <{address}>", encode_header(name)),
        _ => address.to_string(),
    }
}

/// RFC 2047 encoded-word for non-ASCII header values
fn encode_header(value: &str) -> String {
    if value.is_ascii() {
        value.to_string()
    } else {
        format!("=?utf-8?B?{}?=", STANDARD.encode(value))
    }
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

fn wrap_base64(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    encoded
        .as_bytes()
        .chunks(BASE64_LINE_WIDTH)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\r\n")
}
