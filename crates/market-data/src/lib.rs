//! Stockfolio Market Data Crate
//!
//! This crate provides provider-agnostic market data fetching for the
//! Stockfolio application.
//!
//! # Overview
//!
//! The crate exposes a small contract that the caching layer in
//! `stockfolio-core` depends on:
//!
//! - fetch the latest quote for a symbol
//! - search symbols by ticker or company name
//!
//! Each call resolves to success, [`MarketDataError::SymbolNotFound`],
//! [`MarketDataError::RateLimited`], or a generic provider failure.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |  StockService    |  (stockfolio-core, cache orchestration)
//! +------------------+
//!          |
//!          v
//! +--------------------+
//! | MarketDataProvider |  (trait)
//! +--------------------+
//!          |
//!          v
//! +------------------+
//! |   FmpProvider    |  (Financial Modeling Prep over HTTPS)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`StockQuote`] - Latest quote snapshot for a symbol
//! - [`StockSearchResult`] - One ranked symbol match
//! - [`MarketDataProvider`] - Trait every provider implements

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use models::{StockQuote, StockSearchResult};
pub use provider::fmp::FmpProvider;
pub use provider::MarketDataProvider;
