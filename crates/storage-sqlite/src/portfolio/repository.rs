use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use std::sync::Arc;

use stockfolio_core::errors::{DatabaseError, Error};
use stockfolio_core::portfolio::{Portfolio, PortfolioRepositoryTrait, PortfolioStock};
use stockfolio_core::Result;

use super::model::{to_portfolio, NewPortfolioDB, NewPortfolioStockDB, PortfolioDB, PortfolioStockDB};
use crate::db::{encode_timestamp, get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{portfolio_stocks, portfolios};

pub struct PortfolioRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl PortfolioRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        PortfolioRepository { pool, writer }
    }
}

fn find_row(conn: &mut SqliteConnection, owner: &str) -> Result<Option<PortfolioDB>> {
    Ok(portfolios::table
        .filter(portfolios::user_id.eq(owner))
        .select(PortfolioDB::as_select())
        .first::<PortfolioDB>(conn)
        .optional()
        .map_err(StorageError::from)?)
}

fn load(conn: &mut SqliteConnection, row: PortfolioDB) -> Result<Portfolio> {
    let stocks = PortfolioStockDB::belonging_to(&row)
        .select(PortfolioStockDB::as_select())
        .order(portfolio_stocks::id.asc())
        .load::<PortfolioStockDB>(conn)
        .map_err(StorageError::from)?;
    Ok(to_portfolio(row, stocks)?)
}

fn require_row(conn: &mut SqliteConnection, owner: &str) -> Result<PortfolioDB> {
    find_row(conn, owner)?.ok_or_else(|| {
        Error::Database(DatabaseError::NotFound(format!(
            "Portfolio for user {}",
            owner
        )))
    })
}

#[async_trait]
impl PortfolioRepositoryTrait for PortfolioRepository {
    fn get_by_user(&self, owner: &str) -> Result<Option<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;
        match find_row(&mut conn, owner)? {
            Some(row) => Ok(Some(load(&mut conn, row)?)),
            None => Ok(None),
        }
    }

    async fn get_or_create(&self, owner: &str, now: DateTime<Utc>) -> Result<Portfolio> {
        let owner = owner.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                diesel::insert_into(portfolios::table)
                    .values(&NewPortfolioDB::new(&owner, now))
                    .on_conflict(portfolios::user_id)
                    .do_nothing()
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let row = require_row(conn, &owner)?;
                load(conn, row)
            })
            .await
    }

    async fn add_stock(&self, owner: &str, stock: PortfolioStock) -> Result<Portfolio> {
        let owner = owner.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Portfolio> {
                let row = require_row(conn, &owner)?;

                diesel::insert_into(portfolio_stocks::table)
                    .values(&NewPortfolioStockDB::new(row.id, &stock))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                let row = diesel::update(portfolios::table.find(row.id))
                    .set(portfolios::updated_at.eq(encode_timestamp(stock.added_at)))
                    .returning(PortfolioDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                load(conn, row)
            })
            .await
    }

    async fn remove_stock(
        &self,
        owner: &str,
        ticker: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let owner = owner.to_string();
        let ticker = ticker.trim().to_uppercase();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let Some(row) = find_row(conn, &owner)? else {
                    return Ok(false);
                };

                let deleted = diesel::delete(
                    portfolio_stocks::table
                        .filter(portfolio_stocks::portfolio_id.eq(row.id))
                        .filter(portfolio_stocks::symbol.eq(&ticker)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                if deleted > 0 {
                    diesel::update(portfolios::table.find(row.id))
                        .set(portfolios::updated_at.eq(encode_timestamp(now)))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(deleted > 0)
            })
            .await
    }
}
