//! Database models for the four output tables.
//!
//! Decimal and date values are persisted as text to keep exact source
//! precision; the core records own the typed representation.

use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use advisorgpt_core::records::{AssetPerformance, ClientLot, ClientProfile, TargetWeight};

#[derive(Queryable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::client_profile)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfileDB {
    pub client: String,
    pub target_portfolio: String,
}

#[derive(Queryable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::asset_performance)]
#[serde(rename_all = "camelCase")]
pub struct AssetPerformanceDB {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub current_price: Option<String>,
    pub dividend_yield: Option<String>,
    pub pe_ratio: Option<String>,
    pub week_52_high: Option<String>,
    pub week_52_low: Option<String>,
    pub analyst_rating: Option<String>,
    pub target_price: Option<String>,
    pub risk_level: Option<String>,
}

#[derive(Queryable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::client_allocation)]
#[serde(rename_all = "camelCase")]
pub struct ClientAllocationDB {
    pub client: String,
    pub symbol: String,
    pub quantity: String,
    pub buy_price: Option<String>,
    pub purchase_date: Option<String>,
}

#[derive(Queryable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::target_allocation)]
#[serde(rename_all = "camelCase")]
pub struct TargetAllocationDB {
    pub client: String,
    pub asset_class: String,
    pub target_allocation_percent: String,
}

fn decimal_text(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.normalize().to_string())
}

impl From<ClientProfile> for ClientProfileDB {
    fn from(record: ClientProfile) -> Self {
        Self {
            client: record.client,
            target_portfolio: record.target_portfolio,
        }
    }
}

impl From<AssetPerformance> for AssetPerformanceDB {
    fn from(record: AssetPerformance) -> Self {
        Self {
            symbol: record.symbol,
            name: record.name,
            sector: record.sector,
            current_price: decimal_text(record.current_price),
            dividend_yield: decimal_text(record.dividend_yield),
            pe_ratio: decimal_text(record.pe_ratio),
            week_52_high: decimal_text(record.week_52_high),
            week_52_low: decimal_text(record.week_52_low),
            analyst_rating: record.analyst_rating,
            target_price: decimal_text(record.target_price),
            risk_level: record.risk_level,
        }
    }
}

impl From<ClientLot> for ClientAllocationDB {
    fn from(record: ClientLot) -> Self {
        Self {
            client: record.client,
            symbol: record.symbol,
            quantity: record.quantity.normalize().to_string(),
            buy_price: decimal_text(record.buy_price),
            purchase_date: record.purchase_date.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl From<TargetWeight> for TargetAllocationDB {
    fn from(record: TargetWeight) -> Self {
        Self {
            client: record.client,
            asset_class: record.asset_class,
            target_allocation_percent: record.target_allocation_percent.normalize().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lot_conversion_formats_date_and_decimal() {
        let lot = ClientLot {
            client: "Client_7".to_string(),
            symbol: "AAPL".to_string(),
            quantity: dec!(25.00),
            buy_price: Some(dec!(150.50)),
            purchase_date: NaiveDate::from_ymd_opt(2023, 4, 15),
        };
        let row = ClientAllocationDB::from(lot);
        assert_eq!(row.quantity, "25");
        assert_eq!(row.buy_price.as_deref(), Some("150.5"));
        assert_eq!(row.purchase_date.as_deref(), Some("2023-04-15"));
    }

    #[test]
    fn test_asset_conversion_keeps_missing_fields_null() {
        let asset = AssetPerformance {
            symbol: "MSFT".to_string(),
            name: None,
            sector: Some("Technology".to_string()),
            current_price: None,
            dividend_yield: None,
            pe_ratio: None,
            week_52_high: None,
            week_52_low: None,
            analyst_rating: None,
            target_price: None,
            risk_level: None,
        };
        let row = AssetPerformanceDB::from(asset);
        assert_eq!(row.symbol, "MSFT");
        assert!(row.current_price.is_none());
        assert_eq!(row.sector.as_deref(), Some("Technology"));
    }
}
