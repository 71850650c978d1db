/// Header of the client column in both raw exports.
pub const COL_CLIENT: &str = "Client";

/// Header of the asset symbol column in the holdings export.
pub const COL_SYMBOL: &str = "Symbol";

/// Header of the asset name column in the holdings export.
pub const COL_NAME: &str = "Name";

/// Header of the quantity column in the holdings export.
pub const COL_QUANTITY: &str = "Quantity";

/// Header of the current price column in the holdings export.
pub const COL_CURRENT_PRICE: &str = "Current Price";

/// Header of the market value column in the holdings export.
pub const COL_MARKET_VALUE: &str = "Market Value";

/// Header of the buy price column in the holdings export.
pub const COL_BUY_PRICE: &str = "Buy Price";

/// Header of the purchase date column in the holdings export.
pub const COL_PURCHASE_DATE: &str = "Purchase Date";

/// Header of the target portfolio column in the allocation export.
pub const COL_TARGET_PORTFOLIO: &str = "Target Portfolio";

/// Header of the percentage weight column in the allocation export.
pub const COL_TARGET_ALLOCATION: &str = "Target Allocation (%)";

/// Descriptive holdings columns filled from Symbol after a repaired
/// Symbol becomes a reliable join key (raw export headers).
pub const SYMBOL_KEYED_COLUMNS: [&str; 9] = [
    "Name",
    "Sector",
    "P/E Ratio",
    "Dividend Yield",
    "52-Week High",
    "52-Week Low",
    "Analyst Rating",
    "Target Price",
    "Risk Level",
];

/// Columns projected into the asset performance output (raw export headers).
pub const ASSET_PERFORMANCE_COLUMNS: [&str; 11] = [
    "Symbol",
    "Name",
    "Sector",
    "Current Price",
    "Dividend Yield",
    "P/E Ratio",
    "52-Week High",
    "52-Week Low",
    "Analyst Rating",
    "Target Price",
    "Risk Level",
];

/// Columns projected into the client allocation output (raw export headers).
pub const CLIENT_LOT_COLUMNS: [&str; 5] = [
    "Client",
    "Symbol",
    "Quantity",
    "Buy Price",
    "Purchase Date",
];

/// Date format used by the holdings export for purchase dates.
pub const SOURCE_DATE_FORMAT: &str = "%m/%d/%y";

/// Prefix of a well-formed client identifier.
pub const CLIENT_ID_PREFIX: &str = "Client_";

/// Model portfolio labels the allocation export is known to use.
pub const TARGET_PORTFOLIOS: [&str; 4] =
    ["Aggressive Growth", "Growth", "Balanced", "Conservative"];
