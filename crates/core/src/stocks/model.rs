//! Cache record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockfolio_market_data::{StockQuote, StockSearchResult};

/// Cached provider quote for one symbol.
///
/// `cache_date` is written together with `last_updated` but is only ever
/// compared at calendar-day granularity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCacheEntry {
    /// Store-assigned identifier
    pub id: i64,
    /// Uppercase ticker, unique per store
    pub symbol: String,
    pub quote: StockQuote,
    pub last_updated: DateTime<Utc>,
    pub cache_date: DateTime<Utc>,
}

/// Cached search result set for one exact query string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCacheEntry {
    pub id: i64,
    /// Query exactly as received (case and whitespace sensitive)
    pub query: String,
    /// Matches in provider order
    pub results: Vec<StockSearchResult>,
    pub last_updated: DateTime<Utc>,
}

/// Aggregate cache statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of search cache records
    pub search_entries: usize,
    /// Sum of result set lengths across all search records
    pub search_results: usize,
    /// Number of quote cache records
    pub quote_entries: usize,
}

/// Outcome of duplicate quote reconciliation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Distinct symbols that had more than one record
    pub duplicates_found: usize,
    /// Records deleted
    pub entries_removed: usize,
}

/// Canonical form of a ticker used as the quote cache key.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("aapl"), "AAPL");
        assert_eq!(normalize_symbol("  shop.to "), "SHOP.TO");
        assert_eq!(normalize_symbol(""), "");
    }

    #[test]
    fn test_cache_stats_serializes_camel_case() {
        let stats = CacheStats {
            search_entries: 2,
            search_results: 13,
            quote_entries: 4,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["searchEntries"], 2);
        assert_eq!(json["searchResults"], 13);
        assert_eq!(json["quoteEntries"], 4);
    }
}
