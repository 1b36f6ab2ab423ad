//! Header-aware delimited row reader

use std::io::{self, Read};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use domain::Delimiter;

use super::TabularError;

/// One data row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number, the header being line 1
    pub line: u64,
    /// Trimmed field values in column order
    pub fields: Vec<String>,
}

/// Forward-only reader over the data rows of a delimited text
///
/// The header is read eagerly on construction. Data rows are yielded lazily;
/// a row whose width differs from the header yields
/// [`TabularError::FieldCount`]. Blank lines are skipped.
pub struct TabularReader<R: Read> {
    records: StringRecordsIntoIter<LineTracker<R>>,
    header: Vec<String>,
    delimiter: Delimiter,
}

impl<R: Read> std::fmt::Debug for TabularReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabularReader")
            .field("header", &self.header)
            .field("delimiter", &self.delimiter)
            .finish_non_exhaustive()
    }
}

impl<R: Read> TabularReader<R> {
    /// Read the header from `reader`
    pub fn new(reader: R, delimiter: Delimiter) -> Result<Self, TabularError> {
        let mut records = ReaderBuilder::new()
            .delimiter(delimiter.as_byte())
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(LineTracker::new(reader))
            .into_records();

        let header = loop {
            match records.next() {
                None => return Err(TabularError::MissingHeader),
                Some(record) => {
                    let record = record?;
                    if !is_blank(&record) {
                        break to_fields(&record);
                    }
                },
            }
        };

        Ok(Self {
            records,
            header,
            delimiter,
        })
    }

    /// Header fields
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub const fn delimiter(&self) -> Delimiter {
        self.delimiter
    }

    /// csv positions a record before the empty lines it skips, so the line
    /// is derived from the terminators seen in the input instead
    fn line_of(&self, record: &StringRecord) -> u64 {
        record.position().map_or(0, |position| {
            self.records.reader().get_ref().line_at(position.byte())
        })
    }
}

/// Remembers the offsets of line terminators in the bytes read through it
struct LineTracker<R> {
    inner: R,
    offset: u64,
    newlines: Vec<u64>,
    carriage_returns: Vec<u64>,
}

impl<R> LineTracker<R> {
    const fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            newlines: Vec::new(),
            carriage_returns: Vec::new(),
        }
    }

    fn is_terminator(&self, byte: u64) -> bool {
        self.newlines.binary_search(&byte).is_ok()
            || self.carriage_returns.binary_search(&byte).is_ok()
    }

    /// 1-based line of the first non-terminator byte at or after `byte`
    fn line_at(&self, mut byte: u64) -> u64 {
        while self.is_terminator(byte) {
            byte += 1;
        }
        let before = self.newlines.partition_point(|&newline| newline < byte);
        u64::try_from(before).map_or(u64::MAX, |count| count + 1)
    }
}

impl<R: Read> Read for LineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        for &byte in &buf[..read] {
            match byte {
                b'\n' => self.newlines.push(self.offset),
                b'\r' => self.carriage_returns.push(self.offset),
                _ => {},
            }
            self.offset += 1;
        }
        Ok(read)
    }
}

impl<R: Read> Iterator for TabularReader<R> {
    type Item = Result<RawRow, TabularError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            if is_blank(&record) {
                continue;
            }

            let line = self.line_of(&record);
            if record.len() != self.header.len() {
                return Some(Err(TabularError::FieldCount {
                    line,
                    expected: self.header.len(),
                    found: record.len(),
                }));
            }

            return Some(Ok(RawRow {
                line,
                fields: to_fields(&record),
            }));
        }
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

fn to_fields(record: &StringRecord) -> Vec<String> {
    record.iter().map(ToString::to_string).collect()
}
