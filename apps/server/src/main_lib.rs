use std::sync::Arc;

use crate::config::Config;
use stockfolio_core::{
    events::LoggingCacheEventSink,
    portfolio::{PortfolioService, PortfolioServiceTrait},
    stocks::{FreshnessPolicy, StockService, StockServiceTrait},
    utils::SystemClock,
};
use stockfolio_market_data::{FmpProvider, MarketDataProvider};
use stockfolio_storage_sqlite::{
    db::{self, write_actor},
    PortfolioRepository, QuoteCacheRepository, SearchCacheRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub stock_service: Arc<dyn StockServiceTrait>,
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("SF_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wires the application against the live FMP provider.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    if config.fmp_api_key.is_empty() {
        tracing::warn!("FMP_API_KEY is not set; uncached lookups will fail");
    }
    let provider = Arc::new(FmpProvider::new(config.fmp_api_key.clone()));
    build_state_with_provider(config, provider).await
}

pub async fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn MarketDataProvider>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let quote_cache = Arc::new(QuoteCacheRepository::new(pool.clone(), writer.clone()));
    let search_cache = Arc::new(SearchCacheRepository::new(pool.clone(), writer.clone()));
    let portfolio_repository = Arc::new(PortfolioRepository::new(pool.clone(), writer.clone()));

    let clock = Arc::new(SystemClock);
    let policy =
        FreshnessPolicy::default().with_search_max_age_days(config.search_cache_max_age_days)?;

    tracing::info!("Using market data provider {}", provider.id());
    let stock_service: Arc<dyn StockServiceTrait> = Arc::new(
        StockService::new(
            provider,
            quote_cache,
            search_cache,
            clock.clone(),
            Arc::new(LoggingCacheEventSink),
        )
        .with_policy(policy),
    );

    let portfolio_service: Arc<dyn PortfolioServiceTrait> = Arc::new(PortfolioService::new(
        portfolio_repository,
        stock_service.clone(),
        clock,
    ));

    Ok(Arc::new(AppState {
        stock_service,
        portfolio_service,
    }))
}
