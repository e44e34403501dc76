//! SQLite storage implementation for the quote cache.

mod model;
mod repository;

pub use model::{NewQuoteCacheDB, QuoteCacheDB};
pub use repository::QuoteCacheRepository;
