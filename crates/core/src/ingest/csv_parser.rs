//! CSV parsing for the raw advisor exports.
//!
//! The two source files have fixed, known column sets, but they are hand
//! touched spreadsheets: delimiters vary between exports, rows come back
//! ragged, and a UTF-8 BOM shows up depending on which tool wrote the file.
//! Parsing is tolerant: per-row problems are collected as issues instead of
//! aborting the run.

use csv::{ReaderBuilder, Terminator};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::table::Frame;

/// A non-fatal problem encountered while parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseIssue {
    /// Zero-based data row index, when the issue is row-scoped.
    pub row_index: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl ParseIssue {
    fn row(index: usize, message: impl Into<String>) -> Self {
        Self {
            row_index: Some(index),
            message: message.into(),
        }
    }

    fn file(message: impl Into<String>) -> Self {
        Self {
            row_index: None,
            message: message.into(),
        }
    }
}

/// Output of a parse: the sheet as a `Frame` plus collected issues.
#[derive(Debug)]
pub struct ParsedSheet {
    pub frame: Frame,
    pub issues: Vec<ParseIssue>,
}

/// Parse a raw CSV export into a `Frame`.
///
/// The first record is the header row. Empty rows are skipped, short rows
/// are padded with missing cells, and over-long rows are truncated with an
/// issue recorded.
pub fn parse_csv(content: &[u8]) -> Result<ParsedSheet> {
    let mut issues = Vec::new();

    let text = decode_content(content, &mut issues);
    let delimiter = detect_delimiter(&text);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false) // headers handled manually
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_reader(text.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        match result {
            Ok(record) => records.push(record.iter().map(|s| s.to_string()).collect()),
            Err(e) => issues.push(ParseIssue::row(idx, format!("unreadable row: {}", e))),
        }
    }

    records.retain(|row| !row.iter().all(|cell| cell.trim().is_empty()));

    let mut records = records.into_iter();
    let headers: Vec<String> = records
        .next()
        .ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(
                "CSV file is empty or contains no valid records".to_string(),
            ))
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let width = headers.len();
    let rows: Vec<Vec<String>> = records
        .enumerate()
        .map(|(idx, row)| {
            if row.len() > width {
                issues.push(ParseIssue::row(
                    idx,
                    format!(
                        "row has {} columns, expected {}; extra columns ignored",
                        row.len(),
                        width
                    ),
                ));
            }
            row
        })
        .collect();

    let frame = Frame::from_rows(headers, rows)?;

    Ok(ParsedSheet { frame, issues })
}

/// Strip a UTF-8 BOM and decode, falling back to lossy decoding with an
/// issue recorded.
fn decode_content(content: &[u8], issues: &mut Vec<ParseIssue>) -> String {
    let content = content
        .strip_prefix(&[0xEF, 0xBB, 0xBF][..])
        .unwrap_or(content);

    match std::str::from_utf8(content) {
        Ok(s) => s.to_string(),
        Err(e) => {
            issues.push(ParseIssue::file(format!(
                "invalid UTF-8 at byte {}; some characters replaced",
                e.valid_up_to()
            )));
            String::from_utf8_lossy(content).into_owned()
        }
    }
}

/// Pick the delimiter whose column counts are most consistent over the
/// first few lines.
fn detect_delimiter(content: &str) -> u8 {
    let lines: Vec<&str> = content.lines().take(10).collect();

    let mut best = b',';
    let mut best_score = 0usize;
    for delim in [',', ';', '\t'] {
        let counts: Vec<usize> = lines.iter().map(|l| l.matches(delim).count()).collect();
        let Some(&first) = counts.first() else { continue };
        if first == 0 {
            continue;
        }
        let consistent = counts.iter().filter(|&&c| c == first).count();
        let score = first * consistent;
        if score > best_score {
            best_score = score;
            best = delim as u8;
        }
    }
    best
}
