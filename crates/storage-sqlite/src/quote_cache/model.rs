//! Database models for cached quotes.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use stockfolio_core::stocks::QuoteCacheEntry;
use stockfolio_market_data::StockQuote;

use crate::db::{decode_timestamp, encode_timestamp};
use crate::errors::StorageError;

/// Database model for a cached quote row
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::quote_cache)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuoteCacheDB {
    pub id: i64,
    pub symbol: String,
    /// JSON encoded `StockQuote`
    pub quote: String,
    pub last_updated: String,
    pub cache_date: String,
}

/// Insert/overwrite payload for a cached quote
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::quote_cache)]
pub struct NewQuoteCacheDB {
    pub symbol: String,
    pub quote: String,
    pub last_updated: String,
    pub cache_date: String,
}

impl NewQuoteCacheDB {
    pub fn new(symbol: &str, quote: &StockQuote, now: DateTime<Utc>) -> Result<Self, StorageError> {
        let ts = encode_timestamp(now);
        Ok(Self {
            symbol: symbol.to_string(),
            quote: serde_json::to_string(quote)?,
            last_updated: ts.clone(),
            cache_date: ts,
        })
    }
}

impl TryFrom<QuoteCacheDB> for QuoteCacheEntry {
    type Error = StorageError;

    fn try_from(db: QuoteCacheDB) -> Result<Self, Self::Error> {
        Ok(QuoteCacheEntry {
            id: db.id,
            quote: serde_json::from_str(&db.quote)?,
            last_updated: decode_timestamp(&db.last_updated)?,
            cache_date: decode_timestamp(&db.cache_date)?,
            symbol: db.symbol,
        })
    }
}
