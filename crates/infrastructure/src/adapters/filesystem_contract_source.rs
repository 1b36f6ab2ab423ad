//! Filesystem contract source - Implements ContractSourcePort over a directory
//!
//! Every regular file in the input directory is a unit. A unit is marked
//! processed by renaming it to `<prefix><name>` next to the original.

use std::path::{Path, PathBuf};

use application::{
    error::ApplicationError,
    ports::{ContractSourcePort, InputUnit, ParsedRow, ParsedUnit},
};
use async_trait::async_trait;
use domain::CONTRACT_COLUMNS;
use tracing::{debug, info, instrument, warn};

use crate::tabular::{TabularError, TabularReader, detect};

const UTF8_BOM: char = '\u{feff}';

/// Contract files in a local directory
#[derive(Debug, Clone)]
pub struct FilesystemContractSource {
    directory: PathBuf,
    processed_prefix: String,
}

impl FilesystemContractSource {
    pub fn new(directory: impl Into<PathBuf>, processed_prefix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            processed_prefix: processed_prefix.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether a file name is picked up by discovery
    pub fn is_candidate(&self, name: &str) -> bool {
        !name.starts_with('.') && !name.starts_with(&self.processed_prefix)
    }

    /// Path a unit is renamed to once processed
    pub fn processed_path(&self, unit: &InputUnit) -> PathBuf {
        let parent = unit.path.parent().unwrap_or(&self.directory);
        parent.join(format!("{}{}", self.processed_prefix, unit.name))
    }

    fn map_io_error(action: &str, path: &Path, e: &std::io::Error) -> ApplicationError {
        ApplicationError::Internal(format!("failed to {action} {}: {e}", path.display()))
    }
}

/// Sniff, read and convert the text of one contract file
pub fn parse_unit(unit: InputUnit, text: &str) -> Result<ParsedUnit, ApplicationError> {
    let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);
    let malformed = |e: TabularError| {
        ApplicationError::MalformedInput(format!("{}: {e}", unit.name))
    };

    let delimiter = detect(text).map_err(malformed)?;
    let reader = TabularReader::new(text.as_bytes(), delimiter).map_err(malformed)?;

    let header = reader.header().to_vec();
    if header.len() != CONTRACT_COLUMNS.len() {
        return Err(malformed(TabularError::HeaderWidth {
            expected: CONTRACT_COLUMNS.len(),
            found: header.len(),
        }));
    }

    let rows = reader
        .map(|row| row.map(|raw| ParsedRow::from_fields(raw.line, raw.fields)))
        .collect::<Result<Vec<_>, _>>()
        .map_err(malformed)?;

    debug!(
        unit = %unit.name,
        delimiter = %delimiter,
        rows = rows.len(),
        "Parsed contract file"
    );

    Ok(ParsedUnit {
        unit,
        delimiter,
        header,
        rows,
    })
}

#[async_trait]
impl ContractSourcePort for FilesystemContractSource {
    #[instrument(skip(self), fields(dir = %self.directory.display()))]
    async fn discover(&self) -> Result<Vec<InputUnit>, ApplicationError> {
        let mut entries = match tokio::fs::read_dir(&self.directory).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ApplicationError::Configuration(format!(
                    "input directory {} does not exist",
                    self.directory.display()
                )));
            },
            Err(e) => return Err(Self::map_io_error("read", &self.directory, &e)),
        };

        let mut units = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Self::map_io_error("read", &self.directory, &e))?
        {
            let Some(name) = entry.file_name().to_str().map(ToString::to_string) else {
                warn!(path = %entry.path().display(), "Skipping file with non UTF-8 name");
                continue;
            };
            if !self.is_candidate(&name) {
                continue;
            }

            // Follows symlinks
            let is_file = tokio::fs::metadata(entry.path())
                .await
                .is_ok_and(|meta| meta.is_file());
            if is_file {
                units.push(InputUnit::new(name, entry.path()));
            }
        }

        units.sort_by(|a, b| a.name.cmp(&b.name));
        info!(count = units.len(), "Found {} unprocessed file(s)", units.len());
        Ok(units)
    }

    #[instrument(skip(self, unit), fields(unit = %unit.name))]
    async fn load(&self, unit: &InputUnit) -> Result<ParsedUnit, ApplicationError> {
        let bytes = tokio::fs::read(&unit.path)
            .await
            .map_err(|e| Self::map_io_error("read", &unit.path, &e))?;
        let text = String::from_utf8(bytes).map_err(|_| {
            ApplicationError::MalformedInput(format!("{}: {}", unit.name, TabularError::Encoding))
        })?;

        parse_unit(unit.clone(), &text)
    }

    #[instrument(skip(self, unit), fields(unit = %unit.name))]
    async fn mark_processed(&self, unit: &InputUnit) -> Result<(), ApplicationError> {
        let target = self.processed_path(unit);

        let exists = tokio::fs::try_exists(&target)
            .await
            .map_err(|e| Self::map_io_error("inspect", &target, &e))?;
        if exists {
            return Err(ApplicationError::Internal(format!(
                "cannot mark {} processed: {} already exists",
                unit.name,
                target.display()
            )));
        }

        tokio::fs::rename(&unit.path, &target)
            .await
            .map_err(|e| Self::map_io_error("rename", &unit.path, &e))?;

        info!(target = %target.display(), "Marked file as processed");
        Ok(())
    }
}
