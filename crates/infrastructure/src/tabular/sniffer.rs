//! Delimiter detection

use domain::Delimiter;

use super::TabularError;

/// Number of leading lines inspected
pub const SAMPLE_LINES: usize = 3;

/// Detect the field separator of a delimited text
///
/// Every candidate that splits a sampled line into more than one field scores
/// a point for that line. The highest score wins; ties go to the candidate
/// that comes first in [`Delimiter::ALL`].
pub fn detect(sample: &str) -> Result<Delimiter, TabularError> {
    let lines: Vec<&str> = sample.lines().take(SAMPLE_LINES).collect();
    if lines.len() < 2 {
        return Err(TabularError::NoDelimiter(format!(
            "need at least 2 lines, found {}",
            lines.len()
        )));
    }

    let mut scores = [0usize; Delimiter::ALL.len()];
    for line in &lines {
        for (score, delimiter) in scores.iter_mut().zip(Delimiter::ALL) {
            if line.split(delimiter.as_char()).nth(1).is_some() {
                *score += 1;
            }
        }
    }

    // `max_by_key` keeps the last maximum, so walk the candidates in reverse
    Delimiter::ALL
        .iter()
        .zip(scores)
        .rev()
        .filter(|(_, score)| *score > 0)
        .max_by_key(|(_, score)| *score)
        .map(|(delimiter, _)| *delimiter)
        .ok_or_else(|| TabularError::NoDelimiter("no candidate splits any line".to_string()))
}
