//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `quote` - Latest quote snapshot (StockQuote)
//! - `search` - Search result data (StockSearchResult)

mod quote;
mod search;

pub use quote::StockQuote;
pub use search::StockSearchResult;
