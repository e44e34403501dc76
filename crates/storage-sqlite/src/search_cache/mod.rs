//! SQLite storage implementation for the search cache.

mod model;
mod repository;

pub use model::{NewSearchCacheDB, SearchCacheDB};
pub use repository::SearchCacheRepository;
