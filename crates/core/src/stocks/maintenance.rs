//! Cache maintenance: eviction, statistics, duplicate repair and targeted
//! invalidation. Runs against the same stores as the stock service but is
//! never on the read/write hot path.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;

use super::model::{CacheStats, QuoteCacheEntry, ReconcileReport};
use super::store::{QuoteCacheStore, SearchCacheStore};
use crate::errors::{Result, ValidationError};
use crate::events::{CacheEvent, CacheEventSink};
use crate::utils::Clock;

/// Picks the records to delete so that each symbol keeps only its newest.
///
/// Newest is the greatest `(last_updated, id)` pair, so identical timestamps
/// resolve to the higher store-assigned id. Returns the number of symbols
/// that had duplicates and the ids to delete (sorted).
pub fn plan_duplicate_removal(entries: &[QuoteCacheEntry]) -> (usize, Vec<i64>) {
    let mut by_symbol: HashMap<&str, Vec<&QuoteCacheEntry>> = HashMap::new();
    for entry in entries {
        by_symbol.entry(entry.symbol.as_str()).or_default().push(entry);
    }

    let mut duplicates_found = 0;
    let mut to_delete = Vec::new();
    for group in by_symbol.values() {
        if group.len() < 2 {
            continue;
        }
        duplicates_found += 1;
        let keep = group
            .iter()
            .max_by_key(|e| (e.last_updated, e.id))
            .map(|e| e.id);
        to_delete.extend(group.iter().map(|e| e.id).filter(|id| Some(*id) != keep));
    }
    to_delete.sort_unstable();
    (duplicates_found, to_delete)
}

/// Batch operations over the quote and search caches.
#[derive(Clone)]
pub struct CacheMaintenanceService {
    quote_cache: Arc<dyn QuoteCacheStore>,
    search_cache: Arc<dyn SearchCacheStore>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn CacheEventSink>,
}

impl CacheMaintenanceService {
    pub fn new(
        quote_cache: Arc<dyn QuoteCacheStore>,
        search_cache: Arc<dyn SearchCacheStore>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn CacheEventSink>,
    ) -> Self {
        Self {
            quote_cache,
            search_cache,
            clock,
            events,
        }
    }

    /// Deletes records of both caches last written more than `days_old`
    /// days ago. One cutoff is used for both stores. Returns the total
    /// number of records removed.
    pub async fn clear_older_than(&self, days_old: i64) -> Result<usize> {
        if days_old < 0 {
            return Err(ValidationError::InvalidInput(format!(
                "daysOld must not be negative, got {}",
                days_old
            ))
            .into());
        }

        let cutoff = Duration::try_days(days_old)
            .and_then(|age| self.clock.now().checked_sub_signed(age))
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!("daysOld is out of range: {}", days_old))
            })?;
        let searches_removed = self.search_cache.delete_older_than(cutoff).await?;
        let quotes_removed = self.quote_cache.delete_older_than(cutoff).await?;

        self.events.emit(CacheEvent::Evicted {
            cutoff,
            quotes_removed,
            searches_removed,
        });
        Ok(searches_removed + quotes_removed)
    }

    pub fn get_stats(&self) -> Result<CacheStats> {
        Ok(CacheStats {
            search_entries: self.search_cache.count()?,
            search_results: self.search_cache.total_results()?,
            quote_entries: self.quote_cache.count()?,
        })
    }

    /// Collapses duplicate quote records so each symbol keeps only its newest.
    ///
    /// This repairs data written before the unique key existed; it is not
    /// part of the steady-state path.
    pub async fn reconcile_duplicates(&self) -> Result<ReconcileReport> {
        let entries = self.quote_cache.list_all()?;
        let (duplicates_found, to_delete) = plan_duplicate_removal(&entries);

        let entries_removed = if to_delete.is_empty() {
            0
        } else {
            self.quote_cache.delete_by_ids(&to_delete).await?
        };

        self.events.emit(CacheEvent::DuplicatesReconciled {
            duplicates_found,
            entries_removed,
        });
        Ok(ReconcileReport {
            duplicates_found,
            entries_removed,
        })
    }

    pub async fn invalidate_query(&self, query: &str) -> Result<bool> {
        let removed = self.search_cache.delete_by_query(query).await?;
        self.events.emit(CacheEvent::QueryInvalidated {
            query: query.to_string(),
            removed,
        });
        Ok(removed)
    }

    pub async fn invalidate_symbol(&self, symbol: &str) -> Result<bool> {
        let removed = self.quote_cache.delete_by_symbol(symbol).await?;
        self.events.emit(CacheEvent::SymbolInvalidated {
            symbol: symbol.to_string(),
            removed,
        });
        Ok(removed)
    }

    pub async fn clear_all_quotes(&self) -> Result<usize> {
        let removed = self.quote_cache.delete_all().await?;
        self.events.emit(CacheEvent::QuotesCleared { removed });
        Ok(removed)
    }
}
