//! Portfolio module - the single-user watchlist enriched with cached quotes.

mod portfolio_constants;
mod portfolio_model;
mod portfolio_service;
mod portfolio_traits;

#[cfg(test)]
mod portfolio_service_tests;

pub use portfolio_model::{
    NewPortfolioStock, Portfolio, PortfolioStock, PortfolioStockWithQuote, PortfolioWithQuotes,
};
pub use portfolio_service::PortfolioService;
pub use portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
