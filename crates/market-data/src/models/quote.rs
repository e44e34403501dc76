use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest market quote for a single symbol.
///
/// `price`, `change`, `change_percent` and `company_name` are always present.
/// The remaining fields depend on what the provider returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    /// Ticker symbol as reported by the provider (e.g., "AAPL")
    pub symbol: String,

    /// Current/last traded price
    pub price: Decimal,

    /// Absolute change since previous close
    pub change: Decimal,

    /// Percentage change since previous close
    pub change_percent: Decimal,

    /// Company display name
    pub company_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Day high
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    /// Day low
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,
}

impl StockQuote {
    /// Create a quote with only the required fields set.
    pub fn new(
        symbol: impl Into<String>,
        price: Decimal,
        change: Decimal,
        change_percent: Decimal,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change,
            change_percent,
            company_name: company_name.into(),
            market_cap: None,
            volume: None,
            high: None,
            low: None,
            open: None,
            previous_close: None,
        }
    }

    /// Set the day range and open/previous close.
    pub fn with_day_range(
        mut self,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        previous_close: Decimal,
    ) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self.previous_close = Some(previous_close);
        self
    }
}
