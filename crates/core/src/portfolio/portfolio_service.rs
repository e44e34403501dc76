use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::portfolio_model::{
    NewPortfolioStock, PortfolioStock, PortfolioStockWithQuote, PortfolioWithQuotes,
};
use super::portfolio_traits::{PortfolioRepositoryTrait, PortfolioServiceTrait};
use crate::errors::{DatabaseError, Error, PortfolioError, Result};
use crate::stocks::StockServiceTrait;
use crate::utils::Clock;

/// Service for the single-user watchlist
pub struct PortfolioService {
    repository: Arc<dyn PortfolioRepositoryTrait>,
    stock_service: Arc<dyn StockServiceTrait>,
    clock: Arc<dyn Clock>,
}

impl PortfolioService {
    pub fn new(
        repository: Arc<dyn PortfolioRepositoryTrait>,
        stock_service: Arc<dyn StockServiceTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            stock_service,
            clock,
        }
    }

    /// Joins tracked symbols with quotes from the batch lookup.
    async fn with_quotes(&self, user_id: String, stocks: Vec<PortfolioStock>) -> Result<PortfolioWithQuotes> {
        if stocks.is_empty() {
            return Ok(PortfolioWithQuotes::new(user_id, Vec::new()));
        }

        let symbols: Vec<String> = stocks.iter().map(|s| s.symbol.clone()).collect();
        let quotes = self.stock_service.get_multiple_quotes(&symbols).await?;
        debug!(
            "Resolved {} of {} portfolio quotes for {}",
            quotes.len(),
            symbols.len(),
            user_id
        );

        let stocks = stocks
            .into_iter()
            .map(|stock| {
                let quote = quotes
                    .iter()
                    .find(|q| q.symbol.eq_ignore_ascii_case(&stock.symbol))
                    .cloned();
                PortfolioStockWithQuote { stock, quote }
            })
            .collect();

        Ok(PortfolioWithQuotes::new(user_id, stocks))
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn get_portfolio(&self, user_id: &str) -> Result<PortfolioWithQuotes> {
        let portfolio = self.repository.get_or_create(user_id, self.clock.now()).await?;
        self.with_quotes(portfolio.user_id, portfolio.stocks).await
    }

    async fn add_stock(
        &self,
        user_id: &str,
        new_stock: NewPortfolioStock,
    ) -> Result<PortfolioWithQuotes> {
        let new_stock = new_stock.normalized()?;

        let portfolio = self.repository.get_or_create(user_id, self.clock.now()).await?;
        if portfolio.contains(&new_stock.symbol) {
            return Err(PortfolioError::StockAlreadyExists(new_stock.symbol).into());
        }

        let stock = PortfolioStock {
            symbol: new_stock.symbol.clone(),
            company_name: new_stock.company_name,
            added_at: self.clock.now(),
        };
        let portfolio = match self.repository.add_stock(user_id, stock).await {
            Ok(portfolio) => portfolio,
            // Lost a race with a concurrent add of the same symbol
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => {
                return Err(PortfolioError::StockAlreadyExists(new_stock.symbol).into())
            }
            Err(e) => return Err(e),
        };

        debug!("Added {} to portfolio of {}", new_stock.symbol, user_id);
        self.with_quotes(portfolio.user_id, portfolio.stocks).await
    }

    async fn remove_stock(&self, user_id: &str, symbol: &str) -> Result<PortfolioWithQuotes> {
        if self.repository.get_by_user(user_id)?.is_none() {
            return Err(PortfolioError::PortfolioNotFound(user_id.to_string()).into());
        }

        if !self.repository.remove_stock(user_id, symbol, self.clock.now()).await? {
            return Err(PortfolioError::StockNotFound(symbol.to_uppercase()).into());
        }

        debug!("Removed {} from portfolio of {}", symbol, user_id);
        self.get_portfolio(user_id).await
    }
}
