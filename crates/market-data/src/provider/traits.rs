//! Market data provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{StockQuote, StockSearchResult};

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use stockfolio_market_data::{MarketDataError, MarketDataProvider, StockQuote, StockSearchResult};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     async fn get_quote(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
///         Err(MarketDataError::SymbolNotFound(symbol.to_string()))
///     }
///
///     async fn search(&self, _query: &str) -> Result<Vec<StockSearchResult>, MarketDataError> {
///         Ok(Vec::new())
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "FMP". Used for logging and
    /// error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    ///
    /// # Returns
    ///
    /// The quote on success, [`MarketDataError::SymbolNotFound`] if the provider
    /// has no record of the symbol, [`MarketDataError::RateLimited`] if the
    /// provider throttled the call, or another error for any other failure.
    async fn get_quote(&self, symbol: &str) -> Result<StockQuote, MarketDataError>;

    /// Search for symbols matching the query (ticker or company name).
    ///
    /// # Returns
    ///
    /// Up to ten ranked matches in provider order. An empty vector means the
    /// provider found nothing; it is not an error.
    async fn search(&self, query: &str) -> Result<Vec<StockSearchResult>, MarketDataError>;
}
