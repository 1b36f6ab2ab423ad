//! Terminal confirmation of contract files

#![allow(clippy::print_stdout)]

use std::io::Write;

use application::{ApplicationError, ConfirmationPort, ParsedUnit};
use async_trait::async_trait;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use domain::CONTRACT_COLUMNS;
use tracing::{debug, info};

/// Question asked after the table of rows
pub const QUESTION: &str = "Does this look good to you? [yes] ";

/// `y` (yes) or `j` (ja), case-insensitive; an empty answer is no
pub fn is_affirmative(answer: &str) -> bool {
    answer
        .trim()
        .chars()
        .next()
        .is_some_and(|c| matches!(c.to_ascii_lowercase(), 'y' | 'j'))
}

/// Rows of a file as a table under the fixed column titles
pub fn render_unit(unit: &ParsedUnit) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(CONTRACT_COLUMNS);

    for row in &unit.rows {
        table.add_row(row.fields.iter());
    }
    table
}

/// Shows each file and asks the operator on stdin
#[derive(Debug, Default)]
pub struct ConsoleConfirmation;

impl ConsoleConfirmation {
    async fn read_answer() -> Result<String, ApplicationError> {
        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await
        .map_err(|e| ApplicationError::Internal(format!("stdin reader failed: {e}")))?
        .map_err(|e| ApplicationError::Internal(format!("cannot read answer: {e}")))
    }
}

#[async_trait]
impl ConfirmationPort for ConsoleConfirmation {
    async fn confirm(&self, unit: &ParsedUnit) -> Result<bool, ApplicationError> {
        println!();
        println!("📄 {}", unit.unit.name);
        println!("{}", render_unit(unit));
        print!("{QUESTION}");
        std::io::stdout()
            .flush()
            .map_err(|e| ApplicationError::Internal(format!("cannot write prompt: {e}")))?;

        let answer = Self::read_answer().await?;
        debug!(answer = %answer.trim(), "Operator answered");
        Ok(is_affirmative(&answer))
    }
}

/// Accepts every file without asking
#[derive(Debug, Default)]
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationPort for AutoConfirm {
    async fn confirm(&self, unit: &ParsedUnit) -> Result<bool, ApplicationError> {
        info!(unit = %unit.unit.name, rows = unit.rows.len(), "Confirmed automatically");
        Ok(true)
    }
}
