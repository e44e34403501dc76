//! Cache event sink trait and implementations.

use std::sync::{Arc, Mutex};

use log::{debug, info, warn};

use super::CacheEvent;

/// Trait for receiving cache events.
///
/// # Design Rules
///
/// - `emit()` must be fast and non-blocking (no network calls, no DB writes)
/// - Failure to emit must not affect cache operations (best-effort)
pub trait CacheEventSink: Send + Sync {
    /// Emit a single cache event.
    fn emit(&self, event: CacheEvent);

    /// Emit multiple cache events.
    ///
    /// Default implementation calls `emit()` for each event.
    fn emit_batch(&self, events: Vec<CacheEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Writes cache events to the `log` facade.
///
/// Hits and misses go to debug, writes and maintenance to info, and batch
/// failures to warn.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingCacheEventSink;

impl CacheEventSink for LoggingCacheEventSink {
    fn emit(&self, event: CacheEvent) {
        match event {
            CacheEvent::QuoteHit { symbol } => debug!("Quote cache hit for {}", symbol),
            CacheEvent::QuoteMiss { symbol, reason } => {
                debug!("Quote cache miss for {} ({:?})", symbol, reason)
            }
            CacheEvent::QuoteStored { symbol } => info!("Cached quote for {}", symbol),
            CacheEvent::SearchHit { query, results } => {
                debug!("Search cache hit for '{}' ({} results)", query, results)
            }
            CacheEvent::SearchMiss { query, reason } => {
                debug!("Search cache miss for '{}' ({:?})", query, reason)
            }
            CacheEvent::SearchStored { query, results } => {
                info!("Cached {} search results for '{}'", results, query)
            }
            CacheEvent::SearchEmpty { query } => {
                info!("No search results for '{}', not caching", query)
            }
            CacheEvent::BatchFetchFailed { symbol, error } => {
                warn!("Failed to fetch quote for {}: {}", symbol, error)
            }
            CacheEvent::Evicted {
                cutoff,
                quotes_removed,
                searches_removed,
            } => info!(
                "Evicted {} quote and {} search cache entries older than {}",
                quotes_removed, searches_removed, cutoff
            ),
            CacheEvent::DuplicatesReconciled {
                duplicates_found,
                entries_removed,
            } => info!(
                "Removed {} duplicate quote cache entries across {} symbols",
                entries_removed, duplicates_found
            ),
            CacheEvent::QueryInvalidated { query, removed } => {
                info!("Invalidated search cache for '{}' (removed: {})", query, removed)
            }
            CacheEvent::SymbolInvalidated { symbol, removed } => {
                info!("Invalidated quote cache for {} (removed: {})", symbol, removed)
            }
            CacheEvent::QuotesCleared { removed } => {
                info!("Cleared {} quote cache entries", removed)
            }
        }
    }
}

/// No-op implementation for tests or contexts that don't need events.
#[derive(Clone, Default)]
pub struct NoOpCacheEventSink;

impl CacheEventSink for NoOpCacheEventSink {
    fn emit(&self, _event: CacheEvent) {}
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockCacheEventSink {
    events: Arc<Mutex<Vec<CacheEvent>>>,
}

impl MockCacheEventSink {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<CacheEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Returns true if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl CacheEventSink for MockCacheEventSink {
    fn emit(&self, event: CacheEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CacheMissReason;

    #[test]
    fn test_noop_and_logging_sinks_do_not_panic() {
        let events = vec![
            CacheEvent::QuoteHit {
                symbol: "AAPL".to_string(),
            },
            CacheEvent::batch_fetch_failed("BBB", "rate limited"),
            CacheEvent::QuotesCleared { removed: 3 },
        ];
        NoOpCacheEventSink.emit_batch(events.clone());
        LoggingCacheEventSink.emit_batch(events);
    }

    #[test]
    fn test_mock_sink_collects_events() {
        let sink = MockCacheEventSink::new();
        assert!(sink.is_empty());

        sink.emit(CacheEvent::quote_miss("AAPL", CacheMissReason::NotCached));
        assert_eq!(sink.len(), 1);

        sink.emit_batch(vec![
            CacheEvent::QuoteStored {
                symbol: "AAPL".to_string(),
            },
            CacheEvent::QuoteHit {
                symbol: "AAPL".to_string(),
            },
        ]);
        assert_eq!(sink.len(), 3);
        assert!(sink.events()[2].is_hit());

        sink.clear();
        assert!(sink.is_empty());
    }
}
