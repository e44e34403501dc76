//! Stockfolio Core - Domain entities, services, and traits.
//!
//! This crate contains the caching layer that sits between the application
//! and the upstream market data provider, plus the watchlist (portfolio)
//! domain built on top of it. It is database-agnostic and defines traits
//! that are implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod events;
pub mod portfolio;
pub mod stocks;
pub mod utils;

// Re-export common types from the stock and portfolio modules
pub use portfolio::*;
pub use stocks::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
