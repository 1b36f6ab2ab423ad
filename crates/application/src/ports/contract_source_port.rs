//! Contract source port
//!
//! Finds contract files that still need processing, reads them into rows and
//! marks them once every invitation went out.

use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use domain::{ContractRecord, Delimiter, DomainError};

use crate::error::ApplicationError;

/// A discovered contract file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputUnit {
    /// File name without directory
    pub name: String,
    /// Full path of the file
    pub path: PathBuf,
}

impl InputUnit {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// One data row of a contract file
#[derive(Debug)]
pub struct ParsedRow {
    /// 1-based line number in the file, header included
    pub line: u64,
    /// Raw field values
    pub fields: Vec<String>,
    /// Typed record, or the reason the row cannot be used
    pub record: Result<ContractRecord, DomainError>,
}

impl ParsedRow {
    /// Convert raw fields into a row
    pub fn from_fields(line: u64, fields: Vec<String>) -> Self {
        let record = ContractRecord::from_fields(&fields);
        Self {
            line,
            fields,
            record,
        }
    }
}

/// A fully read contract file
#[derive(Debug)]
pub struct ParsedUnit {
    pub unit: InputUnit,
    /// Delimiter detected for the file
    pub delimiter: Delimiter,
    /// Header fields as found in the file
    pub header: Vec<String>,
    /// Data rows in file order
    pub rows: Vec<ParsedRow>,
}

impl ParsedUnit {
    /// Number of rows that converted into a record
    pub fn valid_rows(&self) -> usize {
        self.rows.iter().filter(|row| row.record.is_ok()).count()
    }
}

/// Port for contract file access
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContractSourcePort: Send + Sync {
    /// List unprocessed files, sorted by name
    ///
    /// Fails with [`ApplicationError::Configuration`] when the input
    /// directory does not exist.
    async fn discover(&self) -> Result<Vec<InputUnit>, ApplicationError>;

    /// Detect the delimiter and read every row of a file
    async fn load(&self, unit: &InputUnit) -> Result<ParsedUnit, ApplicationError>;

    /// Rename a file so it is skipped by later discoveries
    async fn mark_processed(&self, unit: &InputUnit) -> Result<(), ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(start: &str) -> Vec<String> {
        ["Jan", "jan@example.nl", "hr@example.nl", start, "12"]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn parsed_row_converts_fields() {
        let row = ParsedRow::from_fields(2, fields("01-01-2023"));
        assert_eq!(row.line, 2);
        assert!(row.record.is_ok());
    }

    #[test]
    fn valid_rows_counts_converted_records() {
        let unit = ParsedUnit {
            unit: InputUnit::new("a.csv", "/tmp/a.csv"),
            delimiter: Delimiter::Comma,
            header: Vec::new(),
            rows: vec![
                ParsedRow::from_fields(2, fields("01-01-2023")),
                ParsedRow::from_fields(3, fields("2023-01-01")),
            ],
        };
        assert_eq!(unit.valid_rows(), 1);
    }
}
