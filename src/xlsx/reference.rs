//! A1-style cell references.

use crate::error::{Error, Result};
use crate::model::Range;

/// Convert column letters to a 1-based column number (`A` = 1, `AA` = 27).
///
/// Letters are case-insensitive. Returns 0 for an empty string.
pub fn column_letters_to_number(letters: &str) -> u32 {
    letters.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(26)
            .saturating_add(u32::from(b.to_ascii_uppercase().wrapping_sub(b'A')) + 1)
    })
}

/// Convert a 1-based column number to letters (`1` = `A`, `27` = `AA`).
pub fn column_number_to_letters(mut number: u32) -> String {
    let mut letters = Vec::new();
    while number > 0 {
        let rem = (number - 1) % 26;
        letters.push(b'A' + rem as u8);
        number = (number - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// 0-based column index from the leading letters of a reference (`"C7"` -> 2).
///
/// Returns `None` when the reference does not start with a letter.
pub fn column_index(reference: &str) -> Option<u32> {
    let end = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(reference.len());
    if end == 0 {
        return None;
    }
    Some(column_letters_to_number(&reference[..end]) - 1)
}

/// Split a single-cell reference into 0-based `(row, column)`.
///
/// Only the strict `[A-Z]+[0-9]+` form is accepted; row 0 is rejected.
pub fn parse_cell(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| !c.is_ascii_uppercase())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, column_letters_to_number(letters) - 1))
}

/// Parse `A1:C3` or a single cell `A1` into a 0-based inclusive range.
///
/// A reference without a colon collapses to a one-cell range.
pub fn parse_range(text: &str) -> Result<Range> {
    let invalid = || Error::InvalidRangeSyntax(text.to_string());

    let (start, end) = match text.split_once(':') {
        Some((start, end)) => (start, Some(end)),
        None => (text, None),
    };

    let (start_row, start_column) = parse_cell(start).ok_or_else(invalid)?;
    let (end_row, end_column) = match end {
        Some(end) => parse_cell(end).ok_or_else(invalid)?,
        None => (start_row, start_column),
    };

    Ok(Range {
        start_row,
        start_column,
        end_row,
        end_column,
    })
}

/// Format 0-based `(row, column)` as an A1 reference.
pub fn format_cell(row: u32, column: u32) -> String {
    format!("{}{}", column_number_to_letters(column + 1), row + 1)
}
