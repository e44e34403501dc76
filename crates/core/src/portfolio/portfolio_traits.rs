use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::portfolio_model::{NewPortfolioStock, Portfolio, PortfolioStock, PortfolioWithQuotes};
use crate::errors::Result;

/// Trait for watchlist repository operations
#[async_trait]
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn get_by_user(&self, user_id: &str) -> Result<Option<Portfolio>>;

    /// Returns the user's portfolio, creating an empty one stamped `now` if absent.
    async fn get_or_create(&self, user_id: &str, now: DateTime<Utc>) -> Result<Portfolio>;

    /// Appends a symbol. Fails with a unique violation if already tracked.
    async fn add_stock(&self, user_id: &str, stock: PortfolioStock) -> Result<Portfolio>;

    /// Removes a symbol (case-insensitive) and stamps `updated_at = now`.
    /// Returns false if it was not tracked.
    async fn remove_stock(&self, user_id: &str, symbol: &str, now: DateTime<Utc>) -> Result<bool>;
}

/// Trait for watchlist service operations
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    async fn get_portfolio(&self, user_id: &str) -> Result<PortfolioWithQuotes>;
    async fn add_stock(
        &self,
        user_id: &str,
        new_stock: NewPortfolioStock,
    ) -> Result<PortfolioWithQuotes>;
    async fn remove_stock(&self, user_id: &str, symbol: &str) -> Result<PortfolioWithQuotes>;
}
