use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sql_types::BigInt;
use diesel::SqliteConnection;
use std::sync::Arc;

use stockfolio_core::stocks::{SearchCacheEntry, SearchCacheStore};
use stockfolio_core::Result;
use stockfolio_market_data::StockSearchResult;

use super::model::{NewSearchCacheDB, SearchCacheDB};
use crate::db::{encode_timestamp, get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::search_cache;
use crate::schema::search_cache::dsl::*;

pub struct SearchCacheRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SearchCacheRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        SearchCacheRepository { pool, writer }
    }
}

#[async_trait]
impl SearchCacheStore for SearchCacheRepository {
    async fn upsert(
        &self,
        key: &str,
        matches: &[StockSearchResult],
        now: DateTime<Utc>,
    ) -> Result<SearchCacheEntry> {
        let row = NewSearchCacheDB::new(key, matches, now)?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<SearchCacheEntry> {
                let saved = diesel::insert_into(search_cache::table)
                    .values(&row)
                    .on_conflict(query)
                    .do_update()
                    .set(&row)
                    .returning(SearchCacheDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(SearchCacheEntry::try_from(saved)?)
            })
            .await
    }

    async fn delete_by_query(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let deleted = diesel::delete(search_cache.filter(query.eq(key)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted > 0)
            })
            .await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(search_cache).execute(conn).into_core()
            })
            .await
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff = encode_timestamp(cutoff);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(search_cache.filter(last_updated.lt(cutoff)))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    fn get(&self, key: &str) -> Result<Option<SearchCacheEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let row = search_cache
            .filter(query.eq(key))
            .select(SearchCacheDB::as_select())
            .first::<SearchCacheDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        match row {
            Some(row) => Ok(Some(SearchCacheEntry::try_from(row)?)),
            None => Ok(None),
        }
    }

    fn count(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let total: i64 = search_cache
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?;
        Ok(total as usize)
    }

    fn total_results(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let total: i64 = search_cache
            .select(sql::<BigInt>("COALESCE(SUM(json_array_length(results)), 0)"))
            .get_result(&mut conn)
            .map_err(StorageError::from)?;
        Ok(total as usize)
    }
}
