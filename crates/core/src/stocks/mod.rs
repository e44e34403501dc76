//! Stock quote and search caching.
//!
//! - [`model`] - Cache records, statistics and reconciliation reports
//! - [`store`] - Storage traits for the two cache collections
//! - [`freshness`] - Pure hit/miss rules
//! - [`maintenance`] - Eviction, stats, duplicate repair, invalidation
//! - [`service`] - Cache-first lookups backed by the market data provider
//!
//! ```text
//! StockService → FreshnessPolicy → hit: return cached
//!      ↓                          → miss: MarketDataProvider → store upsert → return
//! QuoteCacheStore / SearchCacheStore ← CacheMaintenanceService
//! ```

pub mod freshness;
pub mod maintenance;
pub mod model;
pub mod service;
pub mod store;


pub use freshness::{
    evaluate_search_entry, is_quote_fresh, is_quote_fresh_in, is_search_fresh,
    search_entry_usable, FreshnessPolicy, SearchVerdict,
};
pub use maintenance::{plan_duplicate_removal, CacheMaintenanceService};
pub use model::{normalize_symbol, CacheStats, QuoteCacheEntry, ReconcileReport, SearchCacheEntry};
pub use service::{StockService, StockServiceTrait};
pub use store::{QuoteCacheStore, SearchCacheStore};
