use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use stockfolio_core::stocks::{QuoteCacheEntry, QuoteCacheStore};
use stockfolio_core::Result;
use stockfolio_market_data::StockQuote;

use super::model::{NewQuoteCacheDB, QuoteCacheDB};
use crate::db::{encode_timestamp, get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::quote_cache;
use crate::schema::quote_cache::dsl::*;

pub struct QuoteCacheRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl QuoteCacheRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        QuoteCacheRepository { pool, writer }
    }

    fn to_entries(rows: Vec<QuoteCacheDB>) -> Result<Vec<QuoteCacheEntry>> {
        rows.into_iter()
            .map(|row| QuoteCacheEntry::try_from(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl QuoteCacheStore for QuoteCacheRepository {
    async fn upsert(
        &self,
        key: &str,
        new_quote: &StockQuote,
        now: DateTime<Utc>,
    ) -> Result<QuoteCacheEntry> {
        let row = NewQuoteCacheDB::new(key, new_quote, now)?;

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<QuoteCacheEntry> {
                let saved = diesel::insert_into(quote_cache::table)
                    .values(&row)
                    .on_conflict(symbol)
                    .do_update()
                    .set(&row)
                    .returning(QuoteCacheDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(QuoteCacheEntry::try_from(saved)?)
            })
            .await
    }

    async fn delete_by_symbol(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let deleted = diesel::delete(quote_cache.filter(symbol.eq(key)))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(deleted > 0)
            })
            .await
    }

    async fn delete_all(&self) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(quote_cache).execute(conn).into_core()
            })
            .await
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff = encode_timestamp(cutoff);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(quote_cache.filter(last_updated.lt(cutoff)))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<usize> {
        let ids = ids.to_vec();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(quote_cache.filter(id.eq_any(ids)))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    fn get(&self, key: &str) -> Result<Option<QuoteCacheEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let row = quote_cache
            .filter(symbol.eq(key))
            .select(QuoteCacheDB::as_select())
            .first::<QuoteCacheDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        match row {
            Some(row) => Ok(Some(QuoteCacheEntry::try_from(row)?)),
            None => Ok(None),
        }
    }

    fn list_all(&self) -> Result<Vec<QuoteCacheEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = quote_cache
            .order(id.asc())
            .select(QuoteCacheDB::as_select())
            .load::<QuoteCacheDB>(&mut conn)
            .map_err(StorageError::from)?;
        Self::to_entries(rows)
    }

    fn count(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let total: i64 = quote_cache
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?;
        Ok(total as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::setup_db;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn repo() -> (QuoteCacheRepository, tempfile::TempDir) {
        let (pool, writer, dir) = setup_db();
        (QuoteCacheRepository::new(pool, writer), dir)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap()
    }

    fn quote(sym: &str, price: rust_decimal::Decimal) -> StockQuote {
        StockQuote::new(sym, price, dec!(1.5), dec!(0.75), format!("{} Inc.", sym))
    }

    #[tokio::test]
    async fn test_upsert_then_get() {
        let (repo, _dir) = repo();
        let full = quote("AAPL", dec!(190.12)).with_day_range(
            dec!(188),
            dec!(191),
            dec!(187.5),
            dec!(188.62),
        );

        let saved = repo.upsert("AAPL", &full, now()).await.unwrap();
        assert_eq!(saved.symbol, "AAPL");
        assert_eq!(saved.last_updated, now());
        assert_eq!(saved.cache_date, now());

        let loaded = repo.get("AAPL").unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.quote.high, Some(dec!(191)));
        assert!(repo.get("MSFT").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_twice_keeps_one_record_with_second_payload() {
        let (repo, _dir) = repo();
        let first = repo
            .upsert("AAPL", &quote("AAPL", dec!(100)), now())
            .await
            .unwrap();
        let later = now() + Duration::hours(1);
        let second = repo
            .upsert("AAPL", &quote("AAPL", dec!(105)), later)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().unwrap(), 1);
        let loaded = repo.get("AAPL").unwrap().unwrap();
        assert_eq!(loaded.quote.price, dec!(105));
        assert_eq!(loaded.last_updated, later);
        assert_eq!(loaded.cache_date, later);
    }

    #[tokio::test]
    async fn test_symbol_key_is_exact() {
        let (repo, _dir) = repo();
        repo.upsert("AAPL", &quote("AAPL", dec!(1)), now())
            .await
            .unwrap();
        assert!(repo.get("aapl").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_symbol_reports_existence() {
        let (repo, _dir) = repo();
        repo.upsert("TSLA", &quote("TSLA", dec!(250)), now())
            .await
            .unwrap();

        assert!(repo.delete_by_symbol("TSLA").await.unwrap());
        assert!(!repo.delete_by_symbol("TSLA").await.unwrap());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_older_than_boundary() {
        let (repo, _dir) = repo();
        let cutoff = now() - Duration::days(7);
        repo.upsert("OLD", &quote("OLD", dec!(1)), cutoff - Duration::seconds(1))
            .await
            .unwrap();
        repo.upsert("EDGE", &quote("EDGE", dec!(1)), cutoff)
            .await
            .unwrap();
        repo.upsert("NEW", &quote("NEW", dec!(1)), now() - Duration::days(6))
            .await
            .unwrap();

        assert_eq!(repo.delete_older_than(cutoff).await.unwrap(), 1);
        let left: Vec<String> = repo
            .list_all()
            .unwrap()
            .into_iter()
            .map(|e| e.symbol)
            .collect();
        assert_eq!(left, vec!["EDGE".to_string(), "NEW".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_all_and_by_ids() {
        let (repo, _dir) = repo();
        let mut ids = Vec::new();
        for sym in ["AAA", "BBB", "CCC"] {
            ids.push(repo.upsert(sym, &quote(sym, dec!(1)), now()).await.unwrap().id);
        }

        assert_eq!(repo.delete_by_ids(&ids[..2]).await.unwrap(), 2);
        assert_eq!(repo.list_all().unwrap()[0].symbol, "CCC");
        assert_eq!(repo.delete_by_ids(&[]).await.unwrap(), 0);
        assert_eq!(repo.delete_all().await.unwrap(), 1);
        assert_eq!(repo.count().unwrap(), 0);
    }
}
