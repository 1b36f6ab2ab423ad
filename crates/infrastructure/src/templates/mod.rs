//! Template engine for invitation messages
//!
//! Uses Tera. Templates are embedded at compile time; a configured
//! directory may override any of them by providing a file with the same
//! relative name (e.g. `email/planned_meeting.html`).
//!
//! # Example
//!
//! ```rust,ignore
//! use infrastructure::templates::{PlannedMeetingData, TemplateEngine};
//!
//! let engine = TemplateEngine::new()?;
//! let html = engine.render_planned_meeting(&PlannedMeetingData {
//!     name: "Jan".into(),
//!     contract_title: "Contractbespreking".into(),
//!     contract_meeting_date: "04-12-2023 13:00".into(),
//!     salary_title: "Salarisbespreking".into(),
//!     salary_meeting_date: "02-01-2024 17:00".into(),
//! })?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the invitation body template
pub const PLANNED_MEETING_TEMPLATE: &str = "email/planned_meeting.html";

/// Error type for template operations
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template not found
    #[error("Template not found: {0}")]
    NotFound(String),

    /// Template rendering failed
    #[error("Template rendering failed: {0}")]
    Render(String),

    /// Template compilation failed
    #[error("Template compilation failed: {0}")]
    Compile(String),
}

impl From<tera::Error> for TemplateError {
    fn from(e: tera::Error) -> Self {
        match e.kind {
            tera::ErrorKind::TemplateNotFound(name) => Self::NotFound(name),
            _ => Self::Render(e.to_string()),
        }
    }
}

/// Values shown in the invitation body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedMeetingData {
    /// Employee name
    pub name: String,
    pub contract_title: String,
    /// Contract review slot, `DD-MM-YYYY HH:MM`
    pub contract_meeting_date: String,
    pub salary_title: String,
    /// Salary review slot, `DD-MM-YYYY HH:MM`
    pub salary_meeting_date: String,
}

/// Template engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory with templates overriding the embedded ones
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    /// Whether to auto-escape HTML by default
    #[serde(default = "default_true")]
    pub auto_escape: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            templates_dir: None,
            auto_escape: true,
        }
    }
}

/// Embedded templates - compiled into the binary
mod embedded {
    pub const PLANNED_MEETING: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; }
        .signature { color: #666; margin-top: 20px; }
    </style>
</head>
<body>
    <p>Beste {{ name }},</p>
    <p>Er zijn twee gesprekken met HR voor je ingepland:</p>
    <ul>
        <li>{{ contract_title }}: {{ contract_meeting_date }}</li>
        <li>{{ salary_title }}: {{ salary_meeting_date }}</li>
    </ul>
    <p>De uitnodigingen zitten als agenda-bijlage bij dit bericht.</p>
    <div class="signature">
        <p>Met vriendelijke groet,<br>HR</p>
    </div>
</body>
</html>
"#;

    pub const ALL: [(&str, &str); 1] = [(super::PLANNED_MEETING_TEMPLATE, PLANNED_MEETING)];
}

/// Template engine using Tera
#[derive(Clone)]
pub struct TemplateEngine {
    tera: Arc<Tera>,
    config: TemplateConfig,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Create a new template engine with default configuration
    pub fn new() -> Result<Self, TemplateError> {
        Self::with_config(TemplateConfig::default())
    }

    /// Create a new template engine with custom configuration
    pub fn with_config(config: TemplateConfig) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        tera.autoescape_on(if config.auto_escape {
            vec![".html", ".htm", ".xml"]
        } else {
            vec![]
        });

        for (name, source) in embedded::ALL {
            tera.add_raw_template(name, source)
                .map_err(|e| TemplateError::Compile(e.to_string()))?;
        }

        if let Some(dir) = &config.templates_dir {
            Self::load_overrides(&mut tera, dir)?;
        }

        Ok(Self {
            tera: Arc::new(tera),
            config,
        })
    }

    /// Replace embedded templates with files of the same name under `dir`
    fn load_overrides(tera: &mut Tera, dir: &Path) -> Result<(), TemplateError> {
        if !dir.is_dir() {
            return Err(TemplateError::NotFound(format!(
                "templates directory {}",
                dir.display()
            )));
        }

        for (name, _) in embedded::ALL {
            let path = dir.join(name);
            if path.is_file() {
                tera.add_template_file(&path, Some(name))
                    .map_err(|e| TemplateError::Compile(format!("{}: {e}", path.display())))?;
                debug!(template = %name, path = %path.display(), "Loaded custom template");
            }
        }

        info!(dir = %dir.display(), "Loaded custom templates");
        Ok(())
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String, TemplateError> {
        self.tera
            .render(template_name, context)
            .map_err(TemplateError::from)
    }

    /// Render the invitation body
    pub fn render_planned_meeting(
        &self,
        data: &PlannedMeetingData,
    ) -> Result<String, TemplateError> {
        let mut ctx = Context::new();
        ctx.insert("name", &data.name);
        ctx.insert("contract_title", &data.contract_title);
        ctx.insert("contract_meeting_date", &data.contract_meeting_date);
        ctx.insert("salary_title", &data.salary_title);
        ctx.insert("salary_meeting_date", &data.salary_meeting_date);

        self.render(PLANNED_MEETING_TEMPLATE, &ctx)
    }
}
