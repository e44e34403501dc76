//! Financial Modeling Prep (FMP) market data provider implementation.
//!
//! This module provides market data from the FMP "stable" API:
//! - Latest quotes via the /quote endpoint
//! - Symbol search via the /search-name endpoint
//!
//! The free tier has a small daily call allowance, which is why callers cache
//! aggressively. API documentation: https://site.financialmodelingprep.com/developer/docs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{StockQuote, StockSearchResult};
use crate::provider::MarketDataProvider;

const BASE_URL: &str = "https://financialmodelingprep.com/stable";
const PROVIDER_ID: &str = "FMP";

/// Maximum number of search matches returned to callers.
pub const MAX_SEARCH_RESULTS: usize = 10;

// ============================================================================
// API Response Structures
// ============================================================================

/// One element of the /quote response array
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteItem {
    symbol: String,
    price: f64,
    #[serde(default)]
    change: Option<f64>,
    #[serde(default)]
    change_percentage: Option<f64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
    #[serde(default)]
    day_high: Option<f64>,
    #[serde(default)]
    day_low: Option<f64>,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    previous_close: Option<f64>,
}

/// One element of the /search-name response array
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    asset_type: Option<String>,
}

/// Error payload FMP returns (sometimes with a 200 status)
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

// ============================================================================
// FmpProvider
// ============================================================================

/// Financial Modeling Prep market data provider.
pub struct FmpProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FmpProvider {
    /// Create a new FMP provider with the given API key.
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different API root (used by tests and proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Make a GET request to the FMP API and return the raw body.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        if self.api_key.is_empty() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "API key is not configured".to_string(),
            });
        }

        let url = format!("{}{}", self.base_url, endpoint);

        debug!("FMP request: {} with {} params", endpoint, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "Invalid or missing API key".to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })?;

        if !status.is_success() {
            if let Some(err) = parse_error_body(&body) {
                return Err(err);
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        if let Some(err) = parse_error_body(&body) {
            return Err(err);
        }

        Ok(body)
    }
}

/// Detect FMP's in-band error object. Quota exhaustion is reported as
/// "Limit Reach" and is treated as rate limiting.
fn parse_error_body(body: &str) -> Option<MarketDataError> {
    let parsed = serde_json::from_str::<ErrorResponse>(body).ok()?;
    let message = parsed.error_message?;
    if message.to_ascii_lowercase().contains("limit reach") {
        return Some(MarketDataError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        });
    }
    Some(MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message,
    })
}

fn to_decimal(value: f64, field: &str) -> Result<Decimal, MarketDataError> {
    Decimal::try_from(value).map_err(|_| MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message: format!("Invalid {}: {}", field, value),
    })
}

fn to_optional_decimal(value: Option<f64>) -> Option<Decimal> {
    value.and_then(|v| Decimal::try_from(v).ok())
}

/// Map a /quote response body to a [`StockQuote`].
fn parse_quote_body(symbol: &str, body: &str) -> Result<StockQuote, MarketDataError> {
    let items: Vec<QuoteItem> =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse quote response: {}", e),
        })?;

    let item = items
        .into_iter()
        .next()
        .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

    Ok(StockQuote {
        price: to_decimal(item.price, "price")?,
        change: to_decimal(item.change.unwrap_or(0.0), "change")?,
        change_percent: to_decimal(item.change_percentage.unwrap_or(0.0), "changePercentage")?,
        company_name: item.name.unwrap_or_else(|| item.symbol.clone()),
        market_cap: to_optional_decimal(item.market_cap),
        volume: to_optional_decimal(item.volume),
        high: to_optional_decimal(item.day_high),
        low: to_optional_decimal(item.day_low),
        open: to_optional_decimal(item.open),
        previous_close: to_optional_decimal(item.previous_close),
        symbol: item.symbol,
    })
}

/// Map a /search-name response body to at most [`MAX_SEARCH_RESULTS`] matches.
fn parse_search_body(body: &str) -> Result<Vec<StockSearchResult>, MarketDataError> {
    if body.trim().is_empty() || body.trim() == "null" {
        return Ok(Vec::new());
    }

    let items: Vec<SearchItem> =
        serde_json::from_str(body).map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to parse search response: {}", e),
        })?;

    Ok(items
        .into_iter()
        .take(MAX_SEARCH_RESULTS)
        .map(|item| {
            let name = item.name.unwrap_or_else(|| item.symbol.clone());
            StockSearchResult::new(
                item.symbol,
                name,
                item.exchange.unwrap_or_default(),
                item.asset_type.unwrap_or_else(|| "stock".to_string()),
            )
        })
        .collect())
}

#[async_trait]
impl MarketDataProvider for FmpProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_quote(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
        let body = self.fetch("/quote", &[("symbol", symbol)]).await?;
        parse_quote_body(symbol, &body)
    }

    async fn search(&self, query: &str) -> Result<Vec<StockSearchResult>, MarketDataError> {
        let body = self.fetch("/search-name", &[("query", query)]).await?;
        let results = parse_search_body(&body)?;
        if results.is_empty() {
            warn!("FMP: no search results for '{}'", query);
        } else {
            debug!("FMP: found {} search results for '{}'", results.len(), query);
        }
        Ok(results)
    }
}
