//! Target-allocation sheet normalization.
//!
//! The raw allocation export is positional: each client occupies one
//! fixed-size block of consecutive rows, one row per asset class, and the
//! asset class itself is implied by the row's position inside the block.
//! That shape is a stated source-format assumption, not something inferred
//! from the data, so it is carried as an explicit `AllocationShape`.

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::cleaning::columns::normalize_columns;
use crate::cleaning::holdings::parse_decimal;
use crate::constants::{
    CLIENT_ID_PREFIX, COL_CLIENT, COL_TARGET_ALLOCATION, COL_TARGET_PORTFOLIO, TARGET_PORTFOLIOS,
};
use crate::errors::{CleaningError, Result};
use crate::table::Frame;

/// Structural parameters of the allocation export.
///
/// One block of `asset_classes.len()` consecutive rows per client, in the
/// listed class order, `expected_clients` blocks in total. These describe
/// one known export; new exports need their own shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationShape {
    /// Number of client blocks the sheet must contain.
    pub expected_clients: usize,
    /// Asset-class labels, in block row order. The block size is the
    /// length of this list.
    pub asset_classes: Vec<String>,
}

impl Default for AllocationShape {
    fn default() -> Self {
        Self {
            expected_clients: 50,
            asset_classes: ["Stocks", "Bonds", "ETFs", "Cash"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl AllocationShape {
    /// Rows per client block.
    pub fn block_size(&self) -> usize {
        self.asset_classes.len()
    }

    /// Total rows the working sheet is truncated to.
    pub fn total_rows(&self) -> usize {
        self.block_size() * self.expected_clients
    }
}

/// The two frames produced from one allocation sheet, with normalized
/// column names.
#[derive(Debug)]
pub struct AllocationOutput {
    /// Per-client/per-asset-class target weights.
    pub target_weights: Frame,
    /// Distinct (client, target portfolio) pairs.
    pub client_profiles: Frame,
}

/// Reshape one raw allocation sheet.
///
/// Each client block must carry exactly one missing weight, which is
/// re-derived as `100 - sum_of_known` so the per-client weights sum to
/// exactly 100. A complete block is accepted only when it already sums to
/// 100; anything else is an `AllocationGroup` error rather than a silent
/// wrong fill.
pub fn normalize_target_allocation(
    mut frame: Frame,
    shape: &AllocationShape,
) -> Result<AllocationOutput> {
    if shape.block_size() == 0 {
        return Err(CleaningError::EmptyAllocationShape.into());
    }

    frame.column_index(COL_CLIENT)?;
    frame.column_index(COL_TARGET_PORTFOLIO)?;
    frame.column_index(COL_TARGET_ALLOCATION)?;

    let needed = shape.total_rows();
    if frame.len() < needed {
        return Err(CleaningError::UnexpectedRowCount {
            expected: needed,
            found: frame.len(),
        }
        .into());
    }
    frame.truncate(needed);

    let mut client_profiles = distinct_profiles(&frame)?;
    warn_unknown_portfolios(&client_profiles);

    frame.drop_column(COL_TARGET_PORTFOLIO)?;
    for row in 0..frame.len() {
        let client = format!("{}{}", CLIENT_ID_PREFIX, row / shape.block_size() + 1);
        frame.set(row, COL_CLIENT, Some(client))?;
    }
    frame.push_column(
        "Asset Class",
        (0..needed).map(|row| Some(shape.asset_classes[row % shape.block_size()].clone())),
    )?;

    fill_missing_weights(&mut frame, shape)?;

    normalize_columns(&mut frame)?;
    normalize_columns(&mut client_profiles)?;

    Ok(AllocationOutput {
        target_weights: frame,
        client_profiles,
    })
}

/// Distinct (client, portfolio) pairs of the truncated sheet, in sorted
/// order. Rows missing either value are skipped.
fn distinct_profiles(frame: &Frame) -> Result<Frame> {
    let mut pairs: BTreeSet<(String, String)> = BTreeSet::new();
    for row in 0..frame.len() {
        if let (Some(client), Some(portfolio)) = (
            frame.get(row, COL_CLIENT),
            frame.get(row, COL_TARGET_PORTFOLIO),
        ) {
            pairs.insert((client.to_string(), portfolio.to_string()));
        }
    }

    Frame::from_rows(
        vec![COL_CLIENT.to_string(), COL_TARGET_PORTFOLIO.to_string()],
        pairs
            .into_iter()
            .map(|(client, portfolio)| vec![client, portfolio])
            .collect(),
    )
}

/// Flag portfolio labels outside the known model set. The label is kept
/// as-is; an unknown label usually means a typo upstream, not a new model.
fn warn_unknown_portfolios(profiles: &Frame) {
    for row in 0..profiles.len() {
        if let Some(portfolio) = profiles.get(row, COL_TARGET_PORTFOLIO) {
            if !TARGET_PORTFOLIOS.contains(&portfolio) {
                warn!("unknown target portfolio label: {}", portfolio);
            }
        }
    }
}

/// Re-derive the one missing weight of every client block.
fn fill_missing_weights(frame: &mut Frame, shape: &AllocationShape) -> Result<()> {
    let hundred = Decimal::from(100);
    let block = shape.block_size();

    for block_start in (0..frame.len()).step_by(block) {
        let rows = block_start..block_start + block;
        let mut known_sum = Decimal::ZERO;
        let mut missing_rows = Vec::new();

        for row in rows {
            match frame.get(row, COL_TARGET_ALLOCATION).and_then(parse_decimal) {
                Some(weight) => known_sum += weight,
                None => missing_rows.push(row),
            }
        }

        let client = frame
            .get(block_start, COL_CLIENT)
            .unwrap_or_default()
            .to_string();

        match missing_rows.as_slice() {
            [row] => {
                let fill = hundred - known_sum;
                frame.set(*row, COL_TARGET_ALLOCATION, Some(fill.to_string()))?;
            }
            [] if known_sum == hundred => {}
            _ => {
                return Err(CleaningError::AllocationGroup {
                    client,
                    missing: missing_rows.len(),
                    known_sum: known_sum.to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(clients: usize) -> AllocationShape {
        AllocationShape {
            expected_clients: clients,
            ..Default::default()
        }
    }

    fn sheet(rows: Vec<(&str, &str, &str)>) -> Frame {
        Frame::from_rows(
            vec![
                "Client".into(),
                "Target Portfolio".into(),
                "Target Allocation (%)".into(),
            ],
            rows.into_iter()
                .map(|(c, p, w)| vec![c.to_string(), p.to_string(), w.to_string()])
                .collect(),
        )
        .unwrap()
    }

    fn one_client_rows(weights: [&'static str; 4]) -> Vec<(&'static str, &'static str, &'static str)> {
        weights
            .iter()
            .map(|w| ("Client_1", "Balanced", *w))
            .collect()
    }

    #[test]
    fn test_missing_weight_rederived() {
        let frame = sheet(one_client_rows(["30", "25", "", "20"]));
        let output = normalize_target_allocation(frame, &shape(1)).unwrap();
        assert_eq!(
            output.target_weights.get(2, "target_allocation_percent"),
            Some("25")
        );
    }

    #[test]
    fn test_weights_sum_to_hundred() {
        let frame = sheet(one_client_rows(["40", "", "15", "10"]));
        let output = normalize_target_allocation(frame, &shape(1)).unwrap();
        let sum: Decimal = (0..4)
            .map(|row| {
                parse_decimal(
                    output
                        .target_weights
                        .get(row, "target_allocation_percent")
                        .unwrap(),
                )
                .unwrap()
            })
            .sum();
        assert_eq!(sum, Decimal::from(100));
    }

    #[test]
    fn test_synthetic_client_ids_and_class_cycle() {
        let mut rows = one_client_rows(["30", "25", "25", ""]);
        rows.extend(
            ["10", "", "40", "30"]
                .iter()
                .map(|w| ("Client_B", "Aggressive Growth", *w)),
        );
        let frame = sheet(rows);
        let output = normalize_target_allocation(frame, &shape(2)).unwrap();

        assert_eq!(output.target_weights.get(0, "client"), Some("Client_1"));
        assert_eq!(output.target_weights.get(4, "client"), Some("Client_2"));
        assert_eq!(output.target_weights.get(0, "asset_class"), Some("Stocks"));
        assert_eq!(output.target_weights.get(3, "asset_class"), Some("Cash"));
        assert_eq!(output.target_weights.get(5, "asset_class"), Some("Bonds"));
    }

    #[test]
    fn test_profiles_are_distinct_pairs() {
        let mut rows = one_client_rows(["30", "25", "25", ""]);
        rows.extend(
            ["10", "", "40", "30"]
                .iter()
                .map(|w| ("Client_2", "Aggressive Growth", *w)),
        );
        let frame = sheet(rows);
        let output = normalize_target_allocation(frame, &shape(2)).unwrap();

        assert_eq!(output.client_profiles.len(), 2);
        assert_eq!(output.client_profiles.get(0, "client"), Some("Client_1"));
        assert_eq!(
            output.client_profiles.get(0, "target_portfolio"),
            Some("Balanced")
        );
        assert_eq!(
            output.client_profiles.get(1, "target_portfolio"),
            Some("Aggressive Growth")
        );
    }

    #[test]
    fn test_complete_block_summing_to_hundred_accepted() {
        let frame = sheet(one_client_rows(["40", "30", "20", "10"]));
        let output = normalize_target_allocation(frame, &shape(1)).unwrap();
        assert_eq!(
            output.target_weights.get(0, "target_allocation_percent"),
            Some("40")
        );
    }

    #[test]
    fn test_complete_block_with_wrong_sum_is_error() {
        let frame = sheet(one_client_rows(["40", "30", "20", "20"]));
        assert!(normalize_target_allocation(frame, &shape(1)).is_err());
    }

    #[test]
    fn test_two_missing_weights_is_error() {
        let frame = sheet(one_client_rows(["40", "", "", "20"]));
        let err = normalize_target_allocation(frame, &shape(1)).unwrap_err();
        assert!(err.to_string().contains("exactly one missing"));
    }

    #[test]
    fn test_short_sheet_is_error() {
        let frame = sheet(one_client_rows(["30", "25", "", "20"]));
        assert!(normalize_target_allocation(frame, &shape(2)).is_err());
    }

    #[test]
    fn test_profile_labels_are_known_portfolios() {
        let mut rows = one_client_rows(["30", "25", "25", ""]);
        for (weights, portfolio) in [
            (["10", "", "40", "30"], "Aggressive Growth"),
            (["50", "20", "", "10"], "Growth"),
            (["20", "50", "10", ""], "Conservative"),
        ] {
            rows.extend(weights.iter().map(move |w| ("Client_x", portfolio, *w)));
        }
        let frame = sheet(rows);
        let output = normalize_target_allocation(frame, &shape(4)).unwrap();

        for row in 0..output.client_profiles.len() {
            let portfolio = output
                .client_profiles
                .get(row, "target_portfolio")
                .unwrap();
            assert!(crate::constants::TARGET_PORTFOLIOS.contains(&portfolio));
        }
    }

    #[test]
    fn test_empty_asset_class_list_is_error() {
        let frame = sheet(one_client_rows(["30", "25", "25", "20"]));
        let empty = AllocationShape {
            expected_clients: 1,
            asset_classes: Vec::new(),
        };
        let err = normalize_target_allocation(frame, &empty).unwrap_err();
        assert!(err.to_string().contains("at least one asset class"));
    }

    #[test]
    fn test_extra_rows_truncated() {
        let mut rows = one_client_rows(["30", "25", "", "20"]);
        rows.push(("Client_ignored", "Balanced", "99"));
        let frame = sheet(rows);
        let output = normalize_target_allocation(frame, &shape(1)).unwrap();
        assert_eq!(output.target_weights.len(), 4);
        assert_eq!(output.client_profiles.len(), 1);
    }
}
