//! Reference-keyed filling of missing values.
//!
//! A missing value in one column is recovered from another row of the same
//! sheet where both the target column and a paired reference column are
//! known. Once Symbol is repaired it becomes a reliable join key for the
//! rest of that asset's static attributes, so the holdings normalizer uses
//! this transitively: Symbol from Name first, then everything else from
//! Symbol.

use std::collections::HashMap;

use log::debug;

use crate::errors::Result;
use crate::table::Frame;

/// Fill missing `target` cells from a map keyed by `reference`.
///
/// The map is built from rows where both columns are present; the first
/// observed pairing wins, which makes conflicting pairings deterministic
/// per file in row order. Rows whose reference value never co-occurs with
/// a known target stay missing.
///
/// Returns the number of cells filled.
pub fn fill_from_reference(frame: &mut Frame, target: &str, reference: &str) -> Result<usize> {
    frame.column_index(target)?;
    frame.column_index(reference)?;

    let mut lookup: HashMap<String, String> = HashMap::new();
    for row in 0..frame.len() {
        if let (Some(r), Some(t)) = (frame.get(row, reference), frame.get(row, target)) {
            lookup.entry(r.to_string()).or_insert_with(|| t.to_string());
        }
    }

    let mut filled = 0;
    for row in 0..frame.len() {
        if frame.get(row, target).is_some() {
            continue;
        }
        let replacement = frame
            .get(row, reference)
            .and_then(|r| lookup.get(r))
            .cloned();
        if let Some(value) = replacement {
            frame.set(row, target, Some(value))?;
            filled += 1;
        }
    }

    debug!(
        "reference fill {} <- {}: {} cells filled",
        target, reference, filled
    );
    Ok(filled)
}
