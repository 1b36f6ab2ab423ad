//! Delimited text input
//!
//! Delimiter detection and a strict, header-aware row reader built on the
//! `csv` crate.

mod reader;
mod sniffer;

use thiserror::Error;

pub use reader::{RawRow, TabularReader};
pub use sniffer::{SAMPLE_LINES, detect};

/// Errors raised while reading delimited text
#[derive(Debug, Error)]
pub enum TabularError {
    /// Not enough evidence to pick a delimiter
    #[error("No delimiter detected: {0}")]
    NoDelimiter(String),

    /// Input has no header row
    #[error("Missing header row")]
    MissingHeader,

    /// Header does not have the expected number of columns
    #[error("Header has {found} columns, expected {expected}")]
    HeaderWidth { expected: usize, found: usize },

    /// Data row width differs from the header
    #[error("Line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Input is not valid UTF-8
    #[error("Input is not valid UTF-8 text")]
    Encoding,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
