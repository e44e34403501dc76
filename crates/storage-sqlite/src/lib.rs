//! SQLite storage implementation for Stockfolio.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the store and repository traits defined in `stockfolio-core` and contains:
//! - Database connection pooling and the single writer actor
//! - Diesel migrations
//! - The quote cache, search cache and watchlist repositories
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` is database-agnostic and works with traits.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod portfolio;
pub mod quote_cache;
pub mod search_cache;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use portfolio::PortfolioRepository;
pub use quote_cache::QuoteCacheRepository;
pub use search_cache::SearchCacheRepository;

// Re-export from stockfolio-core for convenience
pub use stockfolio_core::errors::{DatabaseError, Error, Result};
