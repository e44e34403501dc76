//! Database models for cached search results.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use stockfolio_core::stocks::SearchCacheEntry;
use stockfolio_market_data::StockSearchResult;

use crate::db::{decode_timestamp, encode_timestamp};
use crate::errors::StorageError;

/// Database model for a cached search row
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::search_cache)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SearchCacheDB {
    pub id: i64,
    pub query: String,
    /// JSON array of `StockSearchResult`
    pub results: String,
    pub last_updated: String,
}

/// Insert/overwrite payload for a cached search
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::search_cache)]
pub struct NewSearchCacheDB {
    pub query: String,
    pub results: String,
    pub last_updated: String,
}

impl NewSearchCacheDB {
    pub fn new(
        query: &str,
        results: &[StockSearchResult],
        now: DateTime<Utc>,
    ) -> Result<Self, StorageError> {
        Ok(Self {
            query: query.to_string(),
            results: serde_json::to_string(results)?,
            last_updated: encode_timestamp(now),
        })
    }
}

impl TryFrom<SearchCacheDB> for SearchCacheEntry {
    type Error = StorageError;

    fn try_from(db: SearchCacheDB) -> Result<Self, Self::Error> {
        Ok(SearchCacheEntry {
            id: db.id,
            results: serde_json::from_str(&db.results)?,
            last_updated: decode_timestamp(&db.last_updated)?,
            query: db.query,
        })
    }
}
