//! SMTP client implementation
//!
//! A lightweight async SMTP client built on tokio and tokio-native-tls.
//! One session is opened per message.

use std::time::Duration;

use base64::Engine;
use secrecy::ExposeSecret;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tokio_native_tls::TlsConnector;
use tracing::{debug, error, instrument, trace};
use uuid::Uuid;

use crate::{
    EmailComposition, SmtpConfig, SmtpError, SmtpSecurity, message::format_mailbox,
    tls::build_native_tls_connector,
};

/// SMTP client
#[derive(Debug, Clone)]
pub struct SmtpClient {
    config: SmtpConfig,
}

impl SmtpClient {
    /// Creates a new SMTP client with the given configuration
    pub const fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &SmtpConfig {
        &self.config
    }

    fn tls_connector(&self) -> Result<TlsConnector, SmtpError> {
        build_native_tls_connector(&self.config.tls).map(TlsConnector::from)
    }

    /// Sends an email and returns its message id
    #[instrument(skip(self, email), fields(to = %email.to))]
    pub async fn send_email(&self, email: &EmailComposition) -> Result<String, SmtpError> {
        email.validate()?;
        debug!(subject = %email.subject, attachments = email.attachments.len(), "Sending email");

        let message_id = format!(
            "<{}.{}@{}>",
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4(),
            self.config.sender_domain()
        );
        let content = self.build_email_content(email, &message_id);

        let secs = self.config.timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), self.send_smtp(email, &content))
            .await
            .map_err(|_| SmtpError::Timeout(secs))??;

        debug!(message_id = %message_id, "Email sent successfully");
        Ok(message_id)
    }

    /// Builds the message in RFC 5322 format
    fn build_email_content(&self, email: &EmailComposition, message_id: &str) -> String {
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S +0000")
            .to_string();
        let boundary = format!("=_{}", Uuid::new_v4().simple());
        let from = format_mailbox(&self.config.from, self.config.from_name.as_deref());
        email.to_mime(&from, message_id, &date, &boundary)
    }

    async fn send_smtp(&self, email: &EmailComposition, content: &str) -> Result<(), SmtpError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let stream = TcpStream::connect(&addr).await.map_err(|e| {
            error!(error = %e, "Failed to connect to SMTP server");
            SmtpError::ConnectionFailed(format!("SMTP connection to {addr} failed: {e}"))
        })?;

        match self.config.security() {
            SmtpSecurity::Implicit => {
                let tls_stream = self
                    .tls_connector()?
                    .connect(&self.config.host, stream)
                    .await
                    .map_err(|e| SmtpError::ConnectionFailed(format!("TLS handshake failed: {e}")))?;
                self.smtp_session(tls_stream, email, content, true).await
            },
            SmtpSecurity::StartTls => self.smtp_starttls_session(stream, email, content).await,
            SmtpSecurity::None => self.smtp_session(stream, email, content, true).await,
        }
    }

    /// Plain greeting and EHLO, then upgrade with STARTTLS
    async fn smtp_starttls_session(
        &self,
        stream: TcpStream,
        email: &EmailComposition,
        content: &str,
    ) -> Result<(), SmtpError> {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);

        self.expect_response(&mut reader, "220").await?;
        self.send_command(&mut writer, &format!("EHLO {}", ehlo_name()))
            .await?;
        self.expect_response(&mut reader, "250").await?;

        self.send_command(&mut writer, "STARTTLS").await?;
        self.expect_response(&mut reader, "220").await?;

        let stream = reader.into_inner().unsplit(writer);
        let tls_stream = self
            .tls_connector()?
            .connect(&self.config.host, stream)
            .await
            .map_err(|e| SmtpError::ConnectionFailed(format!("STARTTLS upgrade failed: {e}")))?;

        // No second greeting after the upgrade
        self.smtp_session(tls_stream, email, content, false).await
    }

    async fn smtp_session<S>(
        &self,
        stream: S,
        email: &EmailComposition,
        content: &str,
        read_greeting: bool,
    ) -> Result<(), SmtpError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);

        if read_greeting {
            self.expect_response(&mut reader, "220").await?;
        }

        self.send_command(&mut writer, &format!("EHLO {}", ehlo_name()))
            .await?;
        self.expect_response(&mut reader, "250").await?;

        if !self.config.username.is_empty() {
            let auth_string = format!(
                "\0{}\0{}",
                self.config.username,
                self.config.password.expose_secret()
            );
            let auth_b64 = base64::engine::general_purpose::STANDARD.encode(auth_string);

            self.send_command(&mut writer, &format!("AUTH PLAIN {auth_b64}"))
                .await?;
            let auth_response = self.read_response(&mut reader).await?;
            if !auth_response.starts_with("235") {
                return Err(SmtpError::AuthenticationFailed);
            }
        }

        self.send_command(&mut writer, &format!("MAIL FROM:<{}>", self.config.from))
            .await?;
        self.expect_response(&mut reader, "250").await?;

        for recipient in email.recipients() {
            self.send_command(&mut writer, &format!("RCPT TO:<{recipient}>"))
                .await?;
            self.expect_response(&mut reader, "25").await?;
        }

        self.send_command(&mut writer, "DATA").await?;
        self.expect_response(&mut reader, "354").await?;

        let escaped_content = content.replace("\r\n.", "\r\n..");
        writer
            .write_all(escaped_content.as_bytes())
            .await
            .map_err(|e| SmtpError::Protocol(format!("Failed to send content: {e}")))?;
        writer
            .write_all(b"\r\n.\r\n")
            .await
            .map_err(|e| SmtpError::Protocol(format!("Failed to end DATA: {e}")))?;
        writer.flush().await.ok();

        self.expect_response(&mut reader, "250").await?;

        // Server may close without answering QUIT
        self.send_command(&mut writer, "QUIT").await?;

        Ok(())
    }

    async fn send_command<W>(&self, writer: &mut W, command: &str) -> Result<(), SmtpError>
    where
        W: AsyncWrite + Unpin,
    {
        trace!(command = %command.split(' ').next().unwrap_or(command), "Sending SMTP command");
        writer
            .write_all(format!("{command}\r\n").as_bytes())
            .await
            .map_err(|e| SmtpError::Protocol(format!("Failed to send command: {e}")))?;
        writer.flush().await.ok();
        Ok(())
    }

    /// Reads a possibly multi-line reply
    async fn read_response<R>(&self, reader: &mut BufReader<R>) -> Result<String, SmtpError>
    where
        R: AsyncRead + Unpin,
    {
        let mut response = String::new();
        loop {
            let mut line = String::new();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| SmtpError::Protocol(format!("Failed to read response: {e}")))?;
            if read == 0 {
                return Err(SmtpError::Protocol(
                    "Connection closed by server".to_string(),
                ));
            }

            trace!(line = %line.trim(), "SMTP response");
            response.push_str(&line);

            if line.len() < 4 || line.as_bytes()[3] != b'-' {
                break;
            }
        }
        Ok(response)
    }

    async fn expect_response<R>(
        &self,
        reader: &mut BufReader<R>,
        expected_code: &str,
    ) -> Result<String, SmtpError>
    where
        R: AsyncRead + Unpin,
    {
        let response = self.read_response(reader).await?;
        if !response.starts_with(expected_code) {
            return Err(SmtpError::Protocol(format!(
                "Expected {expected_code}, got: {}",
                response.trim_end()
            )));
        }
        Ok(response)
    }

    /// Checks if the SMTP server is reachable
    #[instrument(skip(self))]
    pub async fn check_connection(&self) -> Result<bool, SmtpError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let secs = self.config.timeout_secs;

        match tokio::time::timeout(Duration::from_secs(secs), TcpStream::connect(&addr)).await {
            Ok(Ok(_)) => {
                debug!("SMTP server is reachable");
                Ok(true)
            },
            Ok(Err(e)) => {
                debug!(error = %e, "SMTP server is not reachable");
                Ok(false)
            },
            Err(_) => Err(SmtpError::Timeout(secs)),
        }
    }
}

fn ehlo_name() -> String {
    hostname::get().map_or_else(
        |_| "localhost".to_string(),
        |h| h.to_string_lossy().to_string(),
    )
}
