//! Stock service: the cache-aware call path used by request handlers.
//!
//! Consults the cache through the freshness policy, falls back to the
//! market data provider on a miss, persists the fresh result and returns it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use stockfolio_market_data::{MarketDataProvider, StockQuote, StockSearchResult};

use super::freshness::FreshnessPolicy;
use super::maintenance::CacheMaintenanceService;
use super::model::{normalize_symbol, CacheStats, ReconcileReport};
use super::store::{QuoteCacheStore, SearchCacheStore};
use crate::constants::SEARCH_MAX_RESULTS;
use crate::errors::{Result, ValidationError};
use crate::events::{CacheEvent, CacheEventSink, CacheMissReason};
use crate::utils::Clock;

/// Consumer-facing contract of the caching layer.
#[async_trait]
pub trait StockServiceTrait: Send + Sync {
    // =========================================================================
    // Lookups
    // =========================================================================

    /// Latest quote for a symbol (case-insensitive).
    ///
    /// Served from cache when it was written today, otherwise fetched and
    /// cached. Provider errors propagate unchanged; there is no retry.
    async fn get_quote(&self, symbol: &str) -> Result<StockQuote>;

    /// Symbol search. Empty provider responses are returned but not cached.
    async fn search(&self, query: &str) -> Result<Vec<StockSearchResult>>;

    /// Quotes for several symbols.
    ///
    /// Cache hits come first in input order, followed by freshly fetched
    /// quotes in input order. A symbol whose fetch fails is logged and left
    /// out; it never fails the batch. Each symbol appears at most once.
    async fn get_multiple_quotes(&self, symbols: &[String]) -> Result<Vec<StockQuote>>;

    // =========================================================================
    // Maintenance
    // =========================================================================

    async fn clear_old_cache_entries(&self, days_old: i64) -> Result<usize>;

    fn get_cache_stats(&self) -> Result<CacheStats>;

    async fn clear_cache_for_query(&self, query: &str) -> Result<bool>;

    async fn clear_cache_for_symbol(&self, symbol: &str) -> Result<bool>;

    async fn clear_all_quote_cache(&self) -> Result<usize>;

    async fn cleanup_duplicate_entries(&self) -> Result<ReconcileReport>;
}

/// Cache-first stock lookups backed by a [`MarketDataProvider`].
pub struct StockService {
    provider: Arc<dyn MarketDataProvider>,
    quote_cache: Arc<dyn QuoteCacheStore>,
    search_cache: Arc<dyn SearchCacheStore>,
    maintenance: CacheMaintenanceService,
    policy: FreshnessPolicy,
    clock: Arc<dyn Clock>,
    events: Arc<dyn CacheEventSink>,
}

impl StockService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        quote_cache: Arc<dyn QuoteCacheStore>,
        search_cache: Arc<dyn SearchCacheStore>,
        clock: Arc<dyn Clock>,
        events: Arc<dyn CacheEventSink>,
    ) -> Self {
        let maintenance = CacheMaintenanceService::new(
            quote_cache.clone(),
            search_cache.clone(),
            clock.clone(),
            events.clone(),
        );
        Self {
            provider,
            quote_cache,
            search_cache,
            maintenance,
            policy: FreshnessPolicy::default(),
            clock,
            events,
        }
    }

    pub fn with_policy(mut self, policy: FreshnessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn maintenance(&self) -> &CacheMaintenanceService {
        &self.maintenance
    }

    /// Reads `symbol` from the quote cache and applies the day rule.
    fn cached_quote(&self, symbol: &str, now: DateTime<Utc>) -> Result<Option<StockQuote>> {
        match self.quote_cache.get(symbol)? {
            Some(entry) if self.policy.is_quote_fresh(entry.cache_date, now) => {
                self.events.emit(CacheEvent::QuoteHit {
                    symbol: symbol.to_string(),
                });
                Ok(Some(entry.quote))
            }
            Some(_) => {
                self.events
                    .emit(CacheEvent::quote_miss(symbol, CacheMissReason::Stale));
                Ok(None)
            }
            None => {
                self.events
                    .emit(CacheEvent::quote_miss(symbol, CacheMissReason::NotCached));
                Ok(None)
            }
        }
    }

    async fn store_quote(&self, symbol: &str, quote: &StockQuote) -> Result<()> {
        self.quote_cache
            .upsert(symbol, quote, self.clock.now())
            .await?;
        self.events.emit(CacheEvent::QuoteStored {
            symbol: symbol.to_string(),
        });
        Ok(())
    }
}

fn require_symbol(symbol: &str) -> Result<String> {
    let symbol = normalize_symbol(symbol);
    if symbol.is_empty() {
        return Err(ValidationError::MissingField("symbol".to_string()).into());
    }
    Ok(symbol)
}

#[async_trait]
impl StockServiceTrait for StockService {
    async fn get_quote(&self, symbol: &str) -> Result<StockQuote> {
        let symbol = require_symbol(symbol)?;

        if let Some(quote) = self.cached_quote(&symbol, self.clock.now())? {
            return Ok(quote);
        }

        let quote = self.provider.get_quote(&symbol).await?;
        self.store_quote(&symbol, &quote).await?;
        Ok(quote)
    }

    async fn search(&self, query: &str) -> Result<Vec<StockSearchResult>> {
        if query.trim().is_empty() {
            return Err(ValidationError::MissingField("query".to_string()).into());
        }

        let now = self.clock.now();
        match self.search_cache.get(query)? {
            Some(entry) => {
                let verdict = self.policy.evaluate_search(&entry, now);
                match verdict.miss_reason() {
                    None => {
                        self.events.emit(CacheEvent::SearchHit {
                            query: query.to_string(),
                            results: entry.results.len(),
                        });
                        return Ok(entry.results);
                    }
                    Some(reason) => self.events.emit(CacheEvent::search_miss(query, reason)),
                }
            }
            None => self
                .events
                .emit(CacheEvent::search_miss(query, CacheMissReason::NotCached)),
        }

        let mut results = self.provider.search(query).await?;
        results.truncate(SEARCH_MAX_RESULTS);

        if results.is_empty() {
            self.events.emit(CacheEvent::SearchEmpty {
                query: query.to_string(),
            });
            return Ok(results);
        }

        self.search_cache
            .upsert(query, &results, self.clock.now())
            .await?;
        self.events.emit(CacheEvent::SearchStored {
            query: query.to_string(),
            results: results.len(),
        });
        Ok(results)
    }

    async fn get_multiple_quotes(&self, symbols: &[String]) -> Result<Vec<StockQuote>> {
        let now = self.clock.now();
        let mut seen = HashSet::new();
        let mut quotes = Vec::with_capacity(symbols.len());
        let mut to_fetch = Vec::new();

        for raw in symbols {
            let symbol = normalize_symbol(raw);
            if symbol.is_empty() || !seen.insert(symbol.clone()) {
                continue;
            }
            match self.cached_quote(&symbol, now)? {
                Some(quote) => quotes.push(quote),
                None => to_fetch.push(symbol),
            }
        }

        // Sequential on purpose: at most one provider call in flight.
        for symbol in to_fetch {
            let quote = match self.provider.get_quote(&symbol).await {
                Ok(quote) => quote,
                Err(err) => {
                    self.events
                        .emit(CacheEvent::batch_fetch_failed(symbol.as_str(), &err));
                    continue;
                }
            };
            self.store_quote(&symbol, &quote).await?;
            quotes.push(quote);
        }

        Ok(quotes)
    }

    async fn clear_old_cache_entries(&self, days_old: i64) -> Result<usize> {
        self.maintenance.clear_older_than(days_old).await
    }

    fn get_cache_stats(&self) -> Result<CacheStats> {
        self.maintenance.get_stats()
    }

    async fn clear_cache_for_query(&self, query: &str) -> Result<bool> {
        self.maintenance.invalidate_query(query).await
    }

    async fn clear_cache_for_symbol(&self, symbol: &str) -> Result<bool> {
        self.maintenance
            .invalidate_symbol(&normalize_symbol(symbol))
            .await
    }

    async fn clear_all_quote_cache(&self) -> Result<usize> {
        self.maintenance.clear_all_quotes().await
    }

    async fn cleanup_duplicate_entries(&self) -> Result<ReconcileReport> {
        self.maintenance.reconcile_duplicates().await
    }
}
