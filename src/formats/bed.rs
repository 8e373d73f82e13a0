//! BED-like view and focus rows
//!
//! Columns: `chrom start end name [score] [strand]`, tab-separated.
//! A row that cannot be read as a window is rejected with a [`BedParseError`];
//! callers skip such rows rather than fail.

use crate::core::{FocusWindow, Strand, ViewWindow};
use memchr::memchr_iter;
use thiserror::Error;

/// Minimum number of fields for a view or focus row
pub const MIN_FIELDS: usize = 4;

/// Reasons a row is not usable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BedParseError {
    #[error("Too few fields: expected at least {expected}, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("Invalid {0}: {1}")]
    InvalidNumber(&'static str, String),

    #[error("End ({end}) before start ({start})")]
    InvertedRange { start: u64, end: u64 },
}

/// Split a line on tabs without allocating the field strings
pub fn split_fields(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut fields = Vec::with_capacity(6);
    let mut field_start = 0;
    for tab in memchr_iter(b'\t', bytes) {
        fields.push(&line[field_start..tab]);
        field_start = tab + 1;
    }
    fields.push(&line[field_start..]);
    fields
}

fn coord(name: &'static str, value: &str) -> Result<u64, BedParseError> {
    value
        .parse()
        .map_err(|_| BedParseError::InvalidNumber(name, value.to_string()))
}

fn fields_with_range(line: &str) -> Result<(Vec<&str>, u64, u64), BedParseError> {
    let fields = split_fields(line);
    if fields.len() < MIN_FIELDS {
        return Err(BedParseError::TooFewFields {
            expected: MIN_FIELDS,
            found: fields.len(),
        });
    }

    let start = coord("start", fields[1])?;
    let end = coord("end", fields[2])?;
    if end < start {
        return Err(BedParseError::InvertedRange { start, end });
    }
    Ok((fields, start, end))
}

/// A parsed view row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow<'a> {
    pub name: &'a str,
    pub window: ViewWindow,
}

/// A parsed focus row; its chromosome column is read but not kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRow<'a> {
    pub name: &'a str,
    pub window: FocusWindow,
}

/// Parse a view row. Strand comes from field 5; anything other than `+`/`-`,
/// including an absent field, reads as `+`.
pub fn parse_view_row(line: &str) -> Result<ViewRow<'_>, BedParseError> {
    let (fields, start, end) = fields_with_range(line)?;
    let strand = fields
        .get(5)
        .and_then(|s| Strand::from_field(s))
        .unwrap_or_default();

    Ok(ViewRow {
        name: fields[3],
        window: ViewWindow::new(fields[0], start, end, strand),
    })
}

/// Parse a focus row
pub fn parse_focus_row(line: &str) -> Result<FocusRow<'_>, BedParseError> {
    let (fields, start, end) = fields_with_range(line)?;
    Ok(FocusRow {
        name: fields[3],
        window: FocusWindow::new(start, end),
    })
}
