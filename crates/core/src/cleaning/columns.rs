//! Column-name normalization.
//!
//! Maps the human-written spreadsheet headers to the canonical
//! lowercase/underscored names used by the output tables.

use crate::errors::Result;
use crate::table::Frame;

/// Normalize one header to the canonical naming convention.
///
/// Lowercase; the `(%)` suffix becomes `percent`; spaces and hyphens become
/// underscores; `/` is removed; `52_week` is reordered to `week_52` so the
/// name does not start with a digit.
pub fn normalize_column_name(raw: &str) -> String {
    raw.to_lowercase()
        .replace("(%)", "percent")
        .replace([' ', '-'], "_")
        .replace('/', "")
        .replace("52_week", "week_52")
}

/// Normalize every column name of a frame in place.
///
/// Headers that collide after normalization are a `DuplicateColumn` error;
/// the known pipeline inputs never collide, so this only fires on a
/// malformed export.
pub fn normalize_columns(frame: &mut Frame) -> Result<()> {
    frame.rename_columns(normalize_column_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_52_reordered() {
        assert_eq!(normalize_column_name("52-Week High"), "week_52_high");
        assert_eq!(normalize_column_name("52-Week Low"), "week_52_low");
    }

    #[test]
    fn test_already_underscored_week_52() {
        // A partially normalized header still lands on the canonical name.
        assert_eq!(normalize_column_name("52_week high"), "week_52_high");
    }

    #[test]
    fn test_percent_suffix() {
        assert_eq!(
            normalize_column_name("Target Allocation (%)"),
            "target_allocation_percent"
        );
    }

    #[test]
    fn test_slash_removed() {
        assert_eq!(normalize_column_name("P/E Ratio"), "pe_ratio");
    }

    #[test]
    fn test_plain_headers() {
        assert_eq!(normalize_column_name("Client"), "client");
        assert_eq!(normalize_column_name("Buy Price"), "buy_price");
        assert_eq!(normalize_column_name("Purchase Date"), "purchase_date");
    }

    #[test]
    fn test_idempotent_on_normalized_names() {
        for name in ["client", "week_52_high", "target_allocation_percent"] {
            assert_eq!(normalize_column_name(name), name);
        }
    }

    #[test]
    fn test_pipeline_headers_do_not_collide() {
        use std::collections::HashSet;
        let headers = [
            "Client",
            "Symbol",
            "Name",
            "Sector",
            "Quantity",
            "Buy Price",
            "Current Price",
            "Market Value",
            "Purchase Date",
            "Dividend Yield",
            "P/E Ratio",
            "52-Week High",
            "52-Week Low",
            "Analyst Rating",
            "Target Price",
            "Risk Level",
            "Target Portfolio",
            "Target Allocation (%)",
            "Asset Class",
        ];
        let normalized: HashSet<String> =
            headers.iter().map(|h| normalize_column_name(h)).collect();
        assert_eq!(normalized.len(), headers.len());
    }

    #[test]
    fn test_normalize_frame_collision_is_error() {
        let mut frame = Frame::from_rows(
            vec!["Buy Price".into(), "buy_price".into()],
            vec![],
        )
        .unwrap();
        assert!(normalize_columns(&mut frame).is_err());
    }
}
