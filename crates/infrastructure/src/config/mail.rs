//! Outgoing mail configuration

use integration_smtp::{SmtpConfig, SmtpSecurity, TlsConfig};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// SMTP relay settings as read from file and environment
#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpAppConfig {
    /// Relay host
    #[serde(default = "default_host")]
    pub host: String,

    /// Relay port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Login; authentication is skipped when empty
    #[serde(default)]
    pub username: String,

    /// Login password (never serialized)
    #[serde(skip_serializing, default = "empty_secret")]
    pub password: SecretString,

    /// Sender address
    #[serde(default)]
    pub from: String,

    /// Display name for the sender
    #[serde(default)]
    pub from_name: Option<String>,

    /// `implicit`, `starttls` or `none`; derived from the port when unset
    #[serde(default)]
    pub security: Option<SmtpSecurity>,

    /// Session timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub tls: SmtpTlsAppConfig,
}

/// TLS settings for the relay connection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmtpTlsAppConfig {
    /// Verify the relay certificate (default: true)
    #[serde(default)]
    pub verify_certificates: Option<bool>,

    /// Additional CA certificate (PEM)
    #[serde(default)]
    pub ca_cert_path: Option<std::path::PathBuf>,

    /// Minimum accepted TLS version, "1.2" unless set
    #[serde(default)]
    pub min_tls_version: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

const fn default_port() -> u16 {
    465
}

const fn default_timeout_secs() -> u64 {
    30
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

impl std::fmt::Debug for SmtpAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpAppConfig")
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

impl Default for SmtpAppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: String::new(),
            password: empty_secret(),
            from: String::new(),
            from_name: None,
            security: None,
            timeout_secs: default_timeout_secs(),
            tls: SmtpTlsAppConfig::default(),
        }
    }
}

impl SmtpAppConfig {
    /// Client configuration for the SMTP integration
    pub fn to_smtp_config(&self) -> SmtpConfig {
        let mut tls = TlsConfig {
            verify_certificates: self.tls.verify_certificates,
            ca_cert_path: self.tls.ca_cert_path.clone(),
            ..TlsConfig::default()
        };
        if let Some(version) = &self.tls.min_tls_version {
            tls.min_tls_version.clone_from(version);
        }

        SmtpConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.username.clone(),
            password: self.password.clone(),
            from: self.from.clone(),
            from_name: self.from_name.clone(),
            security: self.security,
            timeout_secs: self.timeout_secs,
            tls,
        }
    }
}
