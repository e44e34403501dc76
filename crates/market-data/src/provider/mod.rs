//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Concrete provider implementations (Financial Modeling Prep)
//!
//! The caching layer only depends on the trait, so tests can swap in
//! scripted providers without touching the network.

mod traits;

pub mod fmp;

pub use traits::MarketDataProvider;
