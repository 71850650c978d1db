//! Typed records for the four output tables.
//!
//! Each record has an explicit constructor from a cleaned frame row. The
//! constructors are strict where the cleaning guarantee is strict (key
//! fields must be present, the frame may not carry unknown columns) and
//! lenient where cleaning is best-effort (descriptive fields may be
//! missing).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cleaning::holdings::{parse_date, parse_decimal};
use crate::errors::{Error, Result, ValidationError};
use crate::table::Frame;

/// One client's assigned model portfolio (`client_profile` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub client: String,
    pub target_portfolio: String,
}

/// Per-asset descriptive fields (`asset_performance` table).
///
/// Descriptive fields are optional: a reference-fill miss leaves them
/// missing rather than failing the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPerformance {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub current_price: Option<Decimal>,
    pub dividend_yield: Option<Decimal>,
    pub pe_ratio: Option<Decimal>,
    pub week_52_high: Option<Decimal>,
    pub week_52_low: Option<Decimal>,
    pub analyst_rating: Option<String>,
    pub target_price: Option<Decimal>,
    pub risk_level: Option<String>,
}

/// One client's position in one asset (`client_allocation` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLot {
    pub client: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub buy_price: Option<Decimal>,
    pub purchase_date: Option<NaiveDate>,
}

/// One client's target weight for one asset class (`target_allocation`
/// table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetWeight {
    pub client: String,
    pub asset_class: String,
    pub target_allocation_percent: Decimal,
}

/// Reject frames carrying columns a record type does not accept.
///
/// This replaces the original system's dynamic row construction, which
/// silently passed arbitrary keys through to the ORM.
fn check_columns(frame: &Frame, accepted: &[&str]) -> Result<()> {
    for column in frame.columns() {
        if !accepted.contains(&column.as_str()) {
            return Err(ValidationError::UnknownField(column.clone()).into());
        }
    }
    Ok(())
}

fn required_text(frame: &Frame, row: usize, column: &str) -> Result<String> {
    frame
        .get(row, column)
        .map(str::to_string)
        .ok_or_else(|| Error::from(ValidationError::MissingField(column.to_string())))
}

fn required_decimal(frame: &Frame, row: usize, column: &str) -> Result<Decimal> {
    frame
        .get(row, column)
        .and_then(parse_decimal)
        .ok_or_else(|| Error::from(ValidationError::MissingField(column.to_string())))
}

fn optional_text(frame: &Frame, row: usize, column: &str) -> Option<String> {
    frame.get(row, column).map(str::to_string)
}

fn optional_decimal(frame: &Frame, row: usize, column: &str) -> Option<Decimal> {
    frame.get(row, column).and_then(parse_decimal)
}

impl ClientProfile {
    pub const COLUMNS: [&'static str; 2] = ["client", "target_portfolio"];

    pub fn from_frame_row(frame: &Frame, row: usize) -> Result<Self> {
        check_columns(frame, &Self::COLUMNS)?;
        Ok(Self {
            client: required_text(frame, row, "client")?,
            target_portfolio: required_text(frame, row, "target_portfolio")?,
        })
    }
}

impl AssetPerformance {
    pub const COLUMNS: [&'static str; 11] = [
        "symbol",
        "name",
        "sector",
        "current_price",
        "dividend_yield",
        "pe_ratio",
        "week_52_high",
        "week_52_low",
        "analyst_rating",
        "target_price",
        "risk_level",
    ];

    pub fn from_frame_row(frame: &Frame, row: usize) -> Result<Self> {
        check_columns(frame, &Self::COLUMNS)?;
        Ok(Self {
            symbol: required_text(frame, row, "symbol")?,
            name: optional_text(frame, row, "name"),
            sector: optional_text(frame, row, "sector"),
            current_price: optional_decimal(frame, row, "current_price"),
            dividend_yield: optional_decimal(frame, row, "dividend_yield"),
            pe_ratio: optional_decimal(frame, row, "pe_ratio"),
            week_52_high: optional_decimal(frame, row, "week_52_high"),
            week_52_low: optional_decimal(frame, row, "week_52_low"),
            analyst_rating: optional_text(frame, row, "analyst_rating"),
            target_price: optional_decimal(frame, row, "target_price"),
            risk_level: optional_text(frame, row, "risk_level"),
        })
    }
}

impl ClientLot {
    pub const COLUMNS: [&'static str; 5] =
        ["client", "symbol", "quantity", "buy_price", "purchase_date"];

    pub fn from_frame_row(frame: &Frame, row: usize) -> Result<Self> {
        check_columns(frame, &Self::COLUMNS)?;
        Ok(Self {
            client: required_text(frame, row, "client")?,
            symbol: required_text(frame, row, "symbol")?,
            quantity: required_decimal(frame, row, "quantity")?,
            buy_price: optional_decimal(frame, row, "buy_price"),
            purchase_date: frame.get(row, "purchase_date").and_then(parse_date),
        })
    }
}

impl TargetWeight {
    pub const COLUMNS: [&'static str; 3] = ["client", "asset_class", "target_allocation_percent"];

    pub fn from_frame_row(frame: &Frame, row: usize) -> Result<Self> {
        check_columns(frame, &Self::COLUMNS)?;
        Ok(Self {
            client: required_text(frame, row, "client")?,
            asset_class: required_text(frame, row, "asset_class")?,
            target_allocation_percent: required_decimal(frame, row, "target_allocation_percent")?,
        })
    }
}
