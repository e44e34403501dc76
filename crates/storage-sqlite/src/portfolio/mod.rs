//! SQLite storage implementation for the watchlist.

mod model;
mod repository;

pub use model::{NewPortfolioDB, NewPortfolioStockDB, PortfolioDB, PortfolioStockDB};
pub use repository::PortfolioRepository;
