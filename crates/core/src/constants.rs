/// User id of the single implicit watchlist owner
pub const DEFAULT_USER_ID: &str = "default";

/// Rolling window (in days) during which a cached search result set may be served
pub const SEARCH_CACHE_MAX_AGE_DAYS: i64 = 7;

/// Minimum number of matches a cached search must hold to count as a hit
pub const SEARCH_MIN_RESULTS: usize = 5;

/// Maximum number of matches stored per search query
pub const SEARCH_MAX_RESULTS: usize = 10;

/// Default age cutoff (in days) for cache eviction
pub const DEFAULT_CACHE_EVICTION_DAYS: i64 = 7;
