//! Cache freshness policy.
//!
//! Pure decision logic, no I/O. Quotes are fresh for the remainder of the
//! calendar day they were written on. Search results are fresh for a rolling
//! window and must also hold at least [`SEARCH_MIN_RESULTS`] matches.

use chrono::{DateTime, Duration, FixedOffset, Local, TimeZone, Utc};

use super::model::SearchCacheEntry;
use crate::constants::{SEARCH_CACHE_MAX_AGE_DAYS, SEARCH_MIN_RESULTS};
use crate::errors::{Result, ValidationError};
use crate::events::CacheMissReason;
use crate::utils::time_utils::calendar_date_in;

/// Returns true if `cache_date` and `now` fall on the same local calendar day.
///
/// A quote written at 23:59 is stale at 00:00 the next day.
pub fn is_quote_fresh(cache_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    is_quote_fresh_in(cache_date, now, &Local)
}

/// Same as [`is_quote_fresh`] with an explicit calendar timezone.
pub fn is_quote_fresh_in<Tz: TimeZone>(
    cache_date: DateTime<Utc>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> bool {
    calendar_date_in(cache_date, tz) == calendar_date_in(now, tz)
}

/// Returns true if `now - last_updated < max_age`.
pub fn is_search_fresh(last_updated: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
    now.signed_duration_since(last_updated) < max_age
}

/// Verdict for a cached search record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchVerdict {
    Hit,
    /// Older than the rolling window.
    Expired,
    /// Within the window but with too few matches.
    Insufficient { results: usize },
}

impl SearchVerdict {
    pub fn is_hit(&self) -> bool {
        matches!(self, SearchVerdict::Hit)
    }

    /// Miss reason to report, `None` for a hit.
    pub fn miss_reason(&self) -> Option<CacheMissReason> {
        match *self {
            SearchVerdict::Hit => None,
            SearchVerdict::Expired => Some(CacheMissReason::Expired),
            SearchVerdict::Insufficient { results } => {
                Some(CacheMissReason::Insufficient { results })
            }
        }
    }
}

/// Classifies a search record. Expiry is checked before the result count.
pub fn evaluate_search_entry(
    entry: &SearchCacheEntry,
    now: DateTime<Utc>,
    max_age: Duration,
) -> SearchVerdict {
    if !is_search_fresh(entry.last_updated, now, max_age) {
        return SearchVerdict::Expired;
    }
    if entry.results.len() < SEARCH_MIN_RESULTS {
        return SearchVerdict::Insufficient {
            results: entry.results.len(),
        };
    }
    SearchVerdict::Hit
}

/// Returns true only for a fresh record with enough matches.
pub fn search_entry_usable(entry: &SearchCacheEntry, now: DateTime<Utc>, max_age: Duration) -> bool {
    evaluate_search_entry(entry, now, max_age).is_hit()
}

/// Freshness settings used by the stock service.
#[derive(Clone, Copy, Debug)]
pub struct FreshnessPolicy {
    /// Rolling window for search records
    pub search_max_age: Duration,
    /// Calendar used for quote day boundaries; `None` means process local time
    pub calendar_offset: Option<FixedOffset>,
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            search_max_age: Duration::days(SEARCH_CACHE_MAX_AGE_DAYS),
            calendar_offset: None,
        }
    }
}

impl FreshnessPolicy {
    /// Sets the rolling search window. The window must be a positive,
    /// representable number of days.
    pub fn with_search_max_age_days(mut self, days: i64) -> Result<Self> {
        self.search_max_age = Duration::try_days(days)
            .filter(|_| days > 0)
            .ok_or_else(|| {
                ValidationError::InvalidInput(format!(
                    "search cache max age must be a positive number of days, got {}",
                    days
                ))
            })?;
        Ok(self)
    }

    pub fn with_calendar_offset(mut self, offset: FixedOffset) -> Self {
        self.calendar_offset = Some(offset);
        self
    }

    pub fn is_quote_fresh(&self, cache_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match &self.calendar_offset {
            Some(offset) => is_quote_fresh_in(cache_date, now, offset),
            None => is_quote_fresh(cache_date, now),
        }
    }

    pub fn evaluate_search(&self, entry: &SearchCacheEntry, now: DateTime<Utc>) -> SearchVerdict {
        evaluate_search_entry(entry, now, self.search_max_age)
    }
}
