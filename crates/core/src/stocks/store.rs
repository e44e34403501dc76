//! Cache storage traits.
//!
//! These traits abstract the persistence layer for the two cache
//! collections. Both are keyed by a unique field and every write is
//! expected to be atomic and immediately visible to subsequent reads.
//!
//! # Design Notes
//!
//! - Async methods are used for mutations (they go through the writer)
//! - Sync methods are used for simple reads
//! - `list_all` and `delete_by_ids` exist for duplicate reconciliation only

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stockfolio_market_data::{StockQuote, StockSearchResult};

use super::model::{QuoteCacheEntry, SearchCacheEntry};
use crate::errors::Result;

/// Storage interface for cached quotes, keyed by symbol.
#[async_trait]
pub trait QuoteCacheStore: Send + Sync {
    /// Inserts or replaces the record for `symbol`.
    ///
    /// Sets `quote`, `last_updated = now` and `cache_date = now`. An existing
    /// record is overwritten in place (replace, not merge).
    async fn upsert(
        &self,
        symbol: &str,
        quote: &StockQuote,
        now: DateTime<Utc>,
    ) -> Result<QuoteCacheEntry>;

    /// Returns true if a record existed and was removed.
    async fn delete_by_symbol(&self, symbol: &str) -> Result<bool>;

    /// Removes every record and returns how many were deleted.
    async fn delete_all(&self) -> Result<usize>;

    /// Removes records whose `last_updated` is strictly before `cutoff`.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    /// Removes the records with the given ids.
    async fn delete_by_ids(&self, ids: &[i64]) -> Result<usize>;

    fn get(&self, symbol: &str) -> Result<Option<QuoteCacheEntry>>;

    fn list_all(&self) -> Result<Vec<QuoteCacheEntry>>;

    fn count(&self) -> Result<usize>;
}

/// Storage interface for cached search results, keyed by exact query.
#[async_trait]
pub trait SearchCacheStore: Send + Sync {
    /// Inserts or replaces the record for `query` with `last_updated = now`.
    async fn upsert(
        &self,
        query: &str,
        results: &[StockSearchResult],
        now: DateTime<Utc>,
    ) -> Result<SearchCacheEntry>;

    async fn delete_by_query(&self, query: &str) -> Result<bool>;

    async fn delete_all(&self) -> Result<usize>;

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    fn get(&self, query: &str) -> Result<Option<SearchCacheEntry>>;

    fn count(&self) -> Result<usize>;

    /// Sum of `results.len()` across all records.
    fn total_results(&self) -> Result<usize>;
}
