//! Database models for portfolios and their tracked symbols.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use stockfolio_core::portfolio::{Portfolio, PortfolioStock};

use crate::db::{decode_timestamp, encode_timestamp};
use crate::errors::StorageError;

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioDB {
    pub id: i64,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolios)]
pub struct NewPortfolioDB {
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

impl NewPortfolioDB {
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        let now = encode_timestamp(now);
        Self {
            user_id: user_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Queryable, Identifiable, Selectable, Associations, PartialEq, Debug, Clone)]
#[diesel(belongs_to(PortfolioDB, foreign_key = portfolio_id))]
#[diesel(table_name = crate::schema::portfolio_stocks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioStockDB {
    pub id: i64,
    pub portfolio_id: i64,
    pub symbol: String,
    pub company_name: String,
    pub added_at: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolio_stocks)]
pub struct NewPortfolioStockDB {
    pub portfolio_id: i64,
    pub symbol: String,
    pub company_name: String,
    pub added_at: String,
}

impl NewPortfolioStockDB {
    pub fn new(portfolio_id: i64, stock: &PortfolioStock) -> Self {
        Self {
            portfolio_id,
            symbol: stock.symbol.to_uppercase(),
            company_name: stock.company_name.clone(),
            added_at: encode_timestamp(stock.added_at),
        }
    }
}

impl TryFrom<PortfolioStockDB> for PortfolioStock {
    type Error = StorageError;

    fn try_from(db: PortfolioStockDB) -> Result<Self, Self::Error> {
        Ok(PortfolioStock {
            added_at: decode_timestamp(&db.added_at)?,
            symbol: db.symbol,
            company_name: db.company_name,
        })
    }
}

/// Assembles the domain portfolio from its row and its stock rows.
pub fn to_portfolio(
    db: PortfolioDB,
    stocks: Vec<PortfolioStockDB>,
) -> Result<Portfolio, StorageError> {
    Ok(Portfolio {
        id: db.id,
        created_at: decode_timestamp(&db.created_at)?,
        updated_at: decode_timestamp(&db.updated_at)?,
        user_id: db.user_id,
        stocks: stocks
            .into_iter()
            .map(PortfolioStock::try_from)
            .collect::<Result<Vec<_>, _>>()?,
    })
}
