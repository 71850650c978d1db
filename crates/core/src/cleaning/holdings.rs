//! Holdings sheet normalization.
//!
//! Orchestrates the cleaning of the current-holdings export: identifier
//! repair, duplicate removal, reference-keyed fills, numeric triangulation,
//! type coercion, and the split into the client-lot and asset-performance
//! output frames.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::cleaning::client_ids::{repair_client_ids, MisfillWindow};
use crate::cleaning::columns::normalize_columns;
use crate::cleaning::reference_fill::fill_from_reference;
use crate::constants::{
    ASSET_PERFORMANCE_COLUMNS, CLIENT_LOT_COLUMNS, COL_BUY_PRICE, COL_CLIENT, COL_CURRENT_PRICE,
    COL_MARKET_VALUE, COL_NAME, COL_PURCHASE_DATE, COL_QUANTITY, COL_SYMBOL, SOURCE_DATE_FORMAT,
    SYMBOL_KEYED_COLUMNS,
};
use crate::errors::Result;
use crate::table::Frame;

/// Configuration for the holdings normalizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsCleanConfig {
    /// Window of the known client-id mis-fill defect.
    pub misfill_window: MisfillWindow,
}

/// The two frames produced from one holdings sheet, with normalized
/// column names.
#[derive(Debug)]
pub struct HoldingsOutput {
    /// Per-client lots: client, symbol, quantity, buy_price, purchase_date.
    pub client_lots: Frame,
    /// Per-asset descriptive fields, deduplicated by symbol and by name.
    pub asset_performance: Frame,
}

/// Clean one raw holdings sheet.
///
/// Running the normalizer on its own output is a no-op: canonical client
/// ids, uppercase symbols, derived numerics, and ISO dates all re-normalize
/// to themselves.
pub fn normalize_holdings(mut frame: Frame, config: &HoldingsCleanConfig) -> Result<HoldingsOutput> {
    repair_client_ids(&mut frame, COL_CLIENT, &config.misfill_window)?;
    uppercase_column(&mut frame, COL_SYMBOL)?;

    frame.dedup_by_key(|f, row| {
        (
            f.get(row, COL_CLIENT).map(str::to_string),
            f.get(row, COL_SYMBOL).map(str::to_string),
        )
    });

    // Symbol first: once repaired it keys the remaining descriptive fields.
    fill_from_reference(&mut frame, COL_SYMBOL, COL_NAME)?;
    for column in SYMBOL_KEYED_COLUMNS {
        fill_from_reference(&mut frame, column, COL_SYMBOL)?;
    }

    triangulate_numerics(&mut frame)?;
    coerce_numeric_column(&mut frame, COL_BUY_PRICE)?;
    coerce_date_column(&mut frame, COL_PURCHASE_DATE)?;

    let mut asset_performance = frame.select(&ASSET_PERFORMANCE_COLUMNS)?;
    asset_performance.dedup_by_key(|f, row| f.get(row, COL_SYMBOL).map(str::to_string));
    asset_performance.dedup_by_key(|f, row| f.get(row, COL_NAME).map(str::to_string));

    let mut client_lots = frame.select(&CLIENT_LOT_COLUMNS)?;

    normalize_columns(&mut asset_performance)?;
    normalize_columns(&mut client_lots)?;

    Ok(HoldingsOutput {
        client_lots,
        asset_performance,
    })
}

/// Derive missing quantity, price, and market value by triangulation over
/// `market_value = current_price * quantity`.
///
/// Order matters: quantity first, then price (which may use the derived
/// quantity), then market value. When two of the three are missing nothing
/// can be derived and the cells stay missing.
fn triangulate_numerics(frame: &mut Frame) -> Result<()> {
    frame.column_index(COL_QUANTITY)?;
    frame.column_index(COL_CURRENT_PRICE)?;
    frame.column_index(COL_MARKET_VALUE)?;

    for row in 0..frame.len() {
        if cell_decimal(frame, row, COL_QUANTITY).is_none() {
            let derived = cell_decimal(frame, row, COL_MARKET_VALUE)
                .zip(cell_decimal(frame, row, COL_CURRENT_PRICE))
                .and_then(|(mv, price)| mv.checked_div(price));
            if let Some(quantity) = derived {
                frame.set(row, COL_QUANTITY, Some(quantity.to_string()))?;
            }
        }

        if cell_decimal(frame, row, COL_CURRENT_PRICE).is_none() {
            let derived = cell_decimal(frame, row, COL_MARKET_VALUE)
                .zip(cell_decimal(frame, row, COL_QUANTITY))
                .and_then(|(mv, quantity)| mv.checked_div(quantity));
            if let Some(price) = derived {
                frame.set(row, COL_CURRENT_PRICE, Some(price.to_string()))?;
            }
        }

        if cell_decimal(frame, row, COL_MARKET_VALUE).is_none() {
            let derived = cell_decimal(frame, row, COL_CURRENT_PRICE)
                .zip(cell_decimal(frame, row, COL_QUANTITY))
                .map(|(price, quantity)| price * quantity);
            if let Some(market_value) = derived {
                frame.set(row, COL_MARKET_VALUE, Some(market_value.to_string()))?;
            }
        }
    }
    Ok(())
}

/// Parse a cell as a decimal, tolerating `$` prefixes and thousands
/// separators. Unparseable cells read as missing.
fn cell_decimal(frame: &Frame, row: usize, column: &str) -> Option<Decimal> {
    parse_decimal(frame.get(row, column)?)
}

pub(crate) fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    Decimal::from_str(&cleaned).ok()
}

/// Rewrite a column as canonical decimal strings; unparseable cells become
/// missing.
fn coerce_numeric_column(frame: &mut Frame, column: &str) -> Result<()> {
    frame.column_index(column)?;
    for row in 0..frame.len() {
        let value = frame
            .get(row, column)
            .and_then(parse_decimal)
            .map(|d| d.to_string());
        frame.set(row, column, value)?;
    }
    Ok(())
}

/// Rewrite a column as ISO dates; unparseable cells become missing.
///
/// Accepts the source `%m/%d/%y` format and already-ISO values, so a second
/// pass over clean output changes nothing.
fn coerce_date_column(frame: &mut Frame, column: &str) -> Result<()> {
    frame.column_index(column)?;
    for row in 0..frame.len() {
        let value = frame
            .get(row, column)
            .and_then(parse_date)
            .map(|d| d.format("%Y-%m-%d").to_string());
        frame.set(row, column, value)?;
    }
    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, SOURCE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn uppercase_column(frame: &mut Frame, column: &str) -> Result<()> {
    frame.column_index(column)?;
    for row in 0..frame.len() {
        let value = frame.get(row, column).map(|s| s.to_uppercase());
        frame.set(row, column, value)?;
    }
    Ok(())
}
