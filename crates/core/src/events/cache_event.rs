//! Cache event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a cache lookup did not produce a usable record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMissReason {
    /// No record exists for the key.
    NotCached,
    /// Quote was written on an earlier calendar day.
    Stale,
    /// Search record is older than the rolling window.
    Expired,
    /// Search record is recent but holds too few matches.
    Insufficient { results: usize },
}

/// Facts emitted by the caching layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CacheEvent {
    QuoteHit {
        symbol: String,
    },
    QuoteMiss {
        symbol: String,
        reason: CacheMissReason,
    },
    /// A freshly fetched quote was written to the cache.
    QuoteStored {
        symbol: String,
    },
    SearchHit {
        query: String,
        results: usize,
    },
    SearchMiss {
        query: String,
        reason: CacheMissReason,
    },
    SearchStored {
        query: String,
        results: usize,
    },
    /// Provider returned nothing; the empty set is deliberately not cached.
    SearchEmpty {
        query: String,
    },
    /// One symbol in a batch lookup failed and was left out of the result.
    BatchFetchFailed {
        symbol: String,
        error: String,
    },
    Evicted {
        cutoff: DateTime<Utc>,
        quotes_removed: usize,
        searches_removed: usize,
    },
    DuplicatesReconciled {
        duplicates_found: usize,
        entries_removed: usize,
    },
    QueryInvalidated {
        query: String,
        removed: bool,
    },
    SymbolInvalidated {
        symbol: String,
        removed: bool,
    },
    QuotesCleared {
        removed: usize,
    },
}

impl CacheEvent {
    pub fn quote_miss(symbol: impl Into<String>, reason: CacheMissReason) -> Self {
        Self::QuoteMiss {
            symbol: symbol.into(),
            reason,
        }
    }

    pub fn search_miss(query: impl Into<String>, reason: CacheMissReason) -> Self {
        Self::SearchMiss {
            query: query.into(),
            reason,
        }
    }

    pub fn batch_fetch_failed(symbol: impl Into<String>, error: impl ToString) -> Self {
        Self::BatchFetchFailed {
            symbol: symbol.into(),
            error: error.to_string(),
        }
    }

    /// True for events that record a cache hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::QuoteHit { .. } | Self::SearchHit { .. })
    }

    /// True for events that record a cache miss.
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::QuoteMiss { .. } | Self::SearchMiss { .. })
    }
}
