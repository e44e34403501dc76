//! Watchlist domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockfolio_market_data::StockQuote;

use super::portfolio_constants::PERCENT;
use crate::{errors::ValidationError, Result};

/// A user's watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: i64,
    pub user_id: String,
    pub stocks: Vec<PortfolioStock>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    /// Returns true if `symbol` is already tracked (case-insensitive).
    pub fn contains(&self, symbol: &str) -> bool {
        self.stocks
            .iter()
            .any(|s| s.symbol.eq_ignore_ascii_case(symbol))
    }
}

/// One tracked symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStock {
    pub symbol: String,
    pub company_name: String,
    pub added_at: DateTime<Utc>,
}

/// Input model for adding a symbol to the watchlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioStock {
    pub symbol: String,
    #[serde(default)]
    pub company_name: String,
}

impl NewPortfolioStock {
    /// Validates the input and uppercases the symbol.
    pub fn normalized(self) -> Result<Self> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(ValidationError::MissingField("symbol".to_string()).into());
        }
        Ok(Self {
            symbol,
            company_name: self.company_name.trim().to_string(),
        })
    }
}

/// A tracked symbol with its latest quote, if one could be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioStockWithQuote {
    #[serde(flatten)]
    pub stock: PortfolioStock,
    pub quote: Option<StockQuote>,
}

/// Watchlist enriched with quotes and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioWithQuotes {
    pub user_id: String,
    pub stocks: Vec<PortfolioStockWithQuote>,
    pub total_value: Decimal,
    pub total_change: Decimal,
    pub total_change_percent: Decimal,
}

impl PortfolioWithQuotes {
    /// Builds the view and computes totals from the quotes that are present.
    ///
    /// `total_change_percent` is measured against the previous total
    /// (`total_value - total_change`) and is zero when there is no value.
    pub fn new(user_id: String, stocks: Vec<PortfolioStockWithQuote>) -> Self {
        let (total_value, total_change) = stocks
            .iter()
            .filter_map(|s| s.quote.as_ref())
            .fold((Decimal::ZERO, Decimal::ZERO), |(value, change), q| {
                (value + q.price, change + q.change)
            });

        let total_change_percent = if total_value > Decimal::ZERO {
            total_change
                .checked_div(total_value - total_change)
                .map(|ratio| ratio * PERCENT)
                .unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        };

        Self {
            user_id,
            stocks,
            total_value,
            total_change,
            total_change_percent,
        }
    }
}
