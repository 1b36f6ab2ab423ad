//! SMTP connection settings and errors
//!
//! ## Connection modes
//!
//! - Port 465: implicit TLS (default for the HR mail relay)
//! - Any other port: STARTTLS
//! - `security = "none"`: plaintext, for local relays and test servers

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// SMTP integration errors
#[derive(Debug, Error)]
pub enum SmtpError {
    /// Server is not reachable or the TLS handshake failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Server rejected the credentials
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Unexpected reply during the SMTP dialogue
    #[error("SMTP error: {0}")]
    Protocol(String),

    /// Invalid email address format
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Message cannot be sent as composed
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// No reply within the configured time
    #[error("SMTP session timed out after {0}s")]
    Timeout(u64),
}

/// TLS configuration for SMTP connections
///
/// Certificate verification is enabled unless explicitly disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Whether to verify TLS certificates
    ///
    /// - `None` (default): Verification enabled
    /// - `Some(true)`: Verification explicitly enabled
    /// - `Some(false)`: Verification disabled (self-signed relays)
    #[serde(default)]
    pub verify_certificates: Option<bool>,

    /// Path to a custom CA certificate file (PEM format)
    pub ca_cert_path: Option<PathBuf>,

    /// Minimum TLS version to accept (default: "1.2")
    pub min_tls_version: String,
}

impl TlsConfig {
    /// Check if TLS certificate verification is enabled
    #[must_use]
    pub fn should_verify(&self) -> bool {
        self.verify_certificates.unwrap_or(true)
    }

    /// Create a TLS config that accepts self-signed certificates
    ///
    /// Only use this for relays on a trusted network.
    #[must_use]
    pub fn insecure() -> Self {
        warn!("TLS certificate verification disabled for SMTP relay");
        Self {
            verify_certificates: Some(false),
            ..Self::default()
        }
    }

    /// Create a TLS config with strict certificate verification
    pub fn strict() -> Self {
        Self {
            verify_certificates: Some(true),
            ..Self::default()
        }
    }

    /// Create a TLS config with a custom CA certificate
    pub fn with_ca_cert(ca_cert_path: impl Into<PathBuf>) -> Self {
        Self {
            verify_certificates: Some(true),
            ca_cert_path: Some(ca_cert_path.into()),
            ..Self::default()
        }
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            verify_certificates: None,
            ca_cert_path: None,
            min_tls_version: "1.2".to_string(),
        }
    }
}

/// How the connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    /// TLS from the first byte
    Implicit,
    /// Plain greeting, then upgrade with STARTTLS
    StartTls,
    /// No encryption
    None,
}

impl SmtpSecurity {
    /// Mode implied by a port number
    pub const fn for_port(port: u16) -> Self {
        if port == 465 { Self::Implicit } else { Self::StartTls }
    }
}

/// SMTP relay configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Relay host
    pub host: String,
    /// Relay port (default: 465 for implicit TLS)
    pub port: u16,
    /// Login; authentication is skipped when empty
    pub username: String,
    #[serde(skip_serializing, default = "empty_secret")]
    pub password: SecretString,
    /// Envelope sender and `From` address
    pub from: String,
    /// Display name for the `From` header
    #[serde(default)]
    pub from_name: Option<String>,
    /// Connection mode; derived from the port when unset
    #[serde(default)]
    pub security: Option<SmtpSecurity>,
    /// Upper bound for one complete session in seconds
    pub timeout_secs: u64,
    #[serde(default)]
    pub tls: TlsConfig,
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from", &self.from)
            .field("from_name", &self.from_name)
            .field("security", &self.security)
            .field("timeout_secs", &self.timeout_secs)
            .field("tls", &self.tls)
            .finish()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 465,
            username: String::new(),
            password: empty_secret(),
            from: String::new(),
            from_name: None,
            security: None,
            timeout_secs: 30,
            tls: TlsConfig::default(),
        }
    }
}

impl SmtpConfig {
    /// Creates a configuration for a relay and sender address
    pub fn new(host: impl Into<String>, port: u16, from: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            from: from.into(),
            ..Self::default()
        }
    }

    /// Sets the login credentials
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = SecretString::from(password.into());
        self
    }

    /// Sets the connection mode
    #[must_use]
    pub const fn with_security(mut self, security: SmtpSecurity) -> Self {
        self.security = Some(security);
        self
    }

    /// Sets the TLS configuration
    #[must_use]
    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Effective connection mode
    pub fn security(&self) -> SmtpSecurity {
        self.security
            .unwrap_or_else(|| SmtpSecurity::for_port(self.port))
    }

    /// Domain part of the sender, used for message ids
    pub fn sender_domain(&self) -> &str {
        self.from
            .rsplit_once('@')
            .map_or("localhost", |(_, domain)| domain)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), SmtpError> {
        if self.host.trim().is_empty() {
            return Err(SmtpError::ConnectionFailed(
                "SMTP host is required".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(SmtpError::ConnectionFailed(
                "SMTP port must not be 0".to_string(),
            ));
        }
        if !self.from.contains('@') {
            return Err(SmtpError::InvalidAddress(format!(
                "Invalid sender: {}",
                self.from
            )));
        }
        Ok(())
    }
}
