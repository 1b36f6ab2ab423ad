//! Application configuration
//!
//! Layered the usual way: built-in defaults, then an optional TOML file,
//! then `MEETING_PLANNER_*` environment variables. Nested keys use a double
//! underscore, e.g. `MEETING_PLANNER_SMTP__HOST` or
//! `MEETING_PLANNER_INPUT__DIRECTORY`.
//!
//! Split into focused sub-modules:
//! - `input`: contract file directory and processed marker
//! - `meetings`: titles, time zone and scheduling rules
//! - `mail`: SMTP relay

mod input;
mod mail;
mod meetings;

use std::path::Path;

use domain::EmailAddress;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::templates::TemplateConfig;

pub use input::InputConfig;
pub use mail::{SmtpAppConfig, SmtpTlsAppConfig};
pub use meetings::MeetingsConfig;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "MEETING_PLANNER";

/// Default configuration file name, looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "config";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Contract file input
    #[serde(default)]
    pub input: InputConfig,

    /// Meeting planning
    #[serde(default)]
    pub meetings: MeetingsConfig,

    /// SMTP relay
    #[serde(default)]
    pub smtp: SmtpAppConfig,

    /// Message templates
    #[serde(default)]
    pub templates: TemplateConfig,
}

impl AppConfig {
    /// Load configuration from defaults, a file and the environment
    ///
    /// An explicit `path` must exist. Without one, `config.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let builder = config::Config::builder()
            .set_default("input.directory", "files/csv")?
            .set_default("input.processed_prefix", "processed_")?
            .set_default("smtp.port", 465)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!(
            input = %config.input.directory.display(),
            smtp_host = %config.smtp.host,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Check values that deserialization alone cannot
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.input.processed_prefix.is_empty() {
            return Err(config::ConfigError::Message(
                "input.processed_prefix must not be empty".to_string(),
            ));
        }
        if self.input.processed_prefix.contains(['/', '\\']) {
            return Err(config::ConfigError::Message(format!(
                "input.processed_prefix must be a plain name prefix, got {:?}",
                self.input.processed_prefix
            )));
        }
        if !self.smtp.from.is_empty() {
            EmailAddress::new(&self.smtp.from)
                .map_err(|e| config::ConfigError::Message(format!("smtp.from: {e}")))?;
        }
        self.meetings
            .validate()
            .map_err(|e| config::ConfigError::Message(format!("meetings: {e}")))?;
        Ok(())
    }
}
