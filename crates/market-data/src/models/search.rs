//! Search result models for symbol lookup.

use serde::{Deserialize, Serialize};

/// Result from a ticker/company-name search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSearchResult {
    /// Symbol/ticker (e.g., "AAPL", "SHOP.TO")
    pub symbol: String,

    /// Display name (e.g., "Apple Inc.")
    pub name: String,

    /// Exchange name (e.g., "NASDAQ")
    pub exchange: String,

    /// Asset type (e.g., "stock", "etf")
    pub asset_type: String,
}

impl StockSearchResult {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        exchange: impl Into<String>,
        asset_type: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            exchange: exchange.into(),
            asset_type: asset_type.into(),
        }
    }
}
