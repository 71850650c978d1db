//! Client identifier repair.
//!
//! The upstream export writes client labels free-hand (`Clients23!!`,
//! `client 23`), and one known export mis-fills the identifier across a
//! contiguous row range. The primary pass canonicalizes every label to
//! `Client_<digits>`; the secondary pass patches the known mis-fill range.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::CLIENT_ID_PREFIX;
use crate::errors::Result;
use crate::table::Frame;

/// Row window of the known mis-fill defect, plus the label length that
/// marks a suspect row.
///
/// This encodes a defect observed in one specific source file, not a
/// general rule: rows whose index lies strictly between `after_row` and
/// `before_row` and whose canonicalized label has exactly `suspect_len`
/// characters take the next row's already-canonicalized label. The bounds
/// are configurable so the heuristic's scope stays visible and testable;
/// do not expect the defaults to generalize to new exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MisfillWindow {
    /// Exclusive lower row bound.
    pub after_row: usize,
    /// Exclusive upper row bound.
    pub before_row: usize,
    /// Canonicalized label length that flags a row as mis-filled.
    pub suspect_len: usize,
}

impl Default for MisfillWindow {
    fn default() -> Self {
        // Empirical bounds of the defect in the known holdings export.
        Self {
            after_row: 135,
            before_row: 747,
            suspect_len: 8,
        }
    }
}

impl MisfillWindow {
    fn flags(&self, row: usize, label: &str) -> bool {
        row > self.after_row && row < self.before_row && label.chars().count() == self.suspect_len
    }
}

/// Canonicalize one client label: keep only the numeric characters and
/// re-prefix.
pub fn normalize_client_id(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_numeric()).collect();
    format!("{}{}", CLIENT_ID_PREFIX, digits)
}

/// Repair the client column of a frame in place.
///
/// Every label is canonicalized first; the mis-fill pass then replaces
/// flagged rows with the next row's canonicalized (pre-replacement) label.
/// A flagged last row has no successor and is left as canonicalized.
pub fn repair_client_ids(frame: &mut Frame, column: &str, window: &MisfillWindow) -> Result<()> {
    let canonical: Vec<Option<String>> = frame
        .column_values(column)?
        .into_iter()
        .map(|cell| cell.map(|label| normalize_client_id(&label)))
        .collect();

    let mut repaired = 0usize;
    for row in 0..frame.len() {
        let mut value = canonical[row].clone();
        if let Some(label) = &value {
            if window.flags(row, label) {
                match canonical.get(row + 1).and_then(|next| next.clone()) {
                    Some(next) => {
                        value = Some(next);
                        repaired += 1;
                    }
                    None => warn!("row {}: suspect client label has no successor row", row),
                }
            }
        }
        frame.set(row, column, value)?;
    }

    if repaired > 0 {
        warn!(
            "patched {} mis-filled client labels in rows {}..{} (best-effort heuristic)",
            repaired,
            window.after_row + 1,
            window.before_row
        );
    }
    Ok(())
}
