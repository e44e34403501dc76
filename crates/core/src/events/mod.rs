//! Cache events module.
//!
//! Provides the cache event types and the sink trait the caching layer emits
//! hit/miss/write/eviction facts through. Runtimes decide what to do with
//! them; the default sink writes them to the log.

mod cache_event;
mod sink;

pub use cache_event::*;
pub use sink::*;
