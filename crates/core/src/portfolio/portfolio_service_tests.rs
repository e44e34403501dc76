#[cfg(test)]
mod tests {
    use crate::errors::{DatabaseError, Error, PortfolioError, Result};
    use crate::portfolio::{
        NewPortfolioStock, Portfolio, PortfolioRepositoryTrait, PortfolioService,
        PortfolioServiceTrait, PortfolioStock, PortfolioStockWithQuote, PortfolioWithQuotes,
    };
    use crate::stocks::{CacheStats, ReconcileReport, StockServiceTrait};
    use crate::utils::FixedClock;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use stockfolio_market_data::{StockQuote, StockSearchResult};

    // =========================================================================
    // Mock repository
    // =========================================================================

    #[derive(Clone, Default)]
    struct MockPortfolioRepository {
        portfolios: Arc<Mutex<HashMap<String, Portfolio>>>,
        reject_adds: Arc<Mutex<bool>>,
    }

    impl MockPortfolioRepository {
        fn new() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl PortfolioRepositoryTrait for MockPortfolioRepository {
        fn get_by_user(&self, user_id: &str) -> Result<Option<Portfolio>> {
            Ok(self.portfolios.lock().unwrap().get(user_id).cloned())
        }

        async fn get_or_create(&self, user_id: &str, now: DateTime<Utc>) -> Result<Portfolio> {
            let mut portfolios = self.portfolios.lock().unwrap();
            let next_id = portfolios.len() as i64 + 1;
            Ok(portfolios
                .entry(user_id.to_string())
                .or_insert_with(|| Portfolio {
                    id: next_id,
                    user_id: user_id.to_string(),
                    stocks: Vec::new(),
                    created_at: now,
                    updated_at: now,
                })
                .clone())
        }

        async fn add_stock(&self, user_id: &str, stock: PortfolioStock) -> Result<Portfolio> {
            if *self.reject_adds.lock().unwrap() {
                return Err(Error::Database(DatabaseError::UniqueViolation(
                    "portfolio_stocks.symbol".to_string(),
                )));
            }
            let mut portfolios = self.portfolios.lock().unwrap();
            let portfolio = portfolios
                .get_mut(user_id)
                .ok_or_else(|| Error::Database(DatabaseError::NotFound(user_id.to_string())))?;
            portfolio.updated_at = stock.added_at;
            portfolio.stocks.push(stock);
            Ok(portfolio.clone())
        }

        async fn remove_stock(
            &self,
            user_id: &str,
            symbol: &str,
            now: DateTime<Utc>,
        ) -> Result<bool> {
            let mut portfolios = self.portfolios.lock().unwrap();
            let Some(portfolio) = portfolios.get_mut(user_id) else {
                return Ok(false);
            };
            let before = portfolio.stocks.len();
            portfolio
                .stocks
                .retain(|s| !s.symbol.eq_ignore_ascii_case(symbol));
            let removed = portfolio.stocks.len() < before;
            if removed {
                portfolio.updated_at = now;
            }
            Ok(removed)
        }
    }

    // =========================================================================
    // Mock stock service
    // =========================================================================

    #[derive(Default)]
    struct MockStockService {
        prices: Mutex<HashMap<String, (Decimal, Decimal)>>,
    }

    impl MockStockService {
        fn with_prices(prices: &[(&str, Decimal, Decimal)]) -> Self {
            let map = prices
                .iter()
                .map(|(s, p, c)| (s.to_string(), (*p, *c)))
                .collect();
            Self {
                prices: Mutex::new(map),
            }
        }
    }

    #[async_trait]
    impl StockServiceTrait for MockStockService {
        async fn get_quote(&self, symbol: &str) -> Result<StockQuote> {
            let quotes = self.get_multiple_quotes(&[symbol.to_string()]).await?;
            quotes
                .into_iter()
                .next()
                .ok_or_else(|| Error::Unexpected("no quote".to_string()))
        }

        async fn search(&self, _query: &str) -> Result<Vec<StockSearchResult>> {
            Ok(Vec::new())
        }

        async fn get_multiple_quotes(&self, symbols: &[String]) -> Result<Vec<StockQuote>> {
            let prices = self.prices.lock().unwrap();
            Ok(symbols
                .iter()
                .filter_map(|s| {
                    prices
                        .get(s)
                        .map(|(p, c)| StockQuote::new(s.as_str(), *p, *c, dec!(0), s.as_str()))
                })
                .collect())
        }

        async fn clear_old_cache_entries(&self, _days_old: i64) -> Result<usize> {
            Ok(0)
        }

        fn get_cache_stats(&self) -> Result<CacheStats> {
            Ok(CacheStats::default())
        }

        async fn clear_cache_for_query(&self, _query: &str) -> Result<bool> {
            Ok(false)
        }

        async fn clear_cache_for_symbol(&self, _symbol: &str) -> Result<bool> {
            Ok(false)
        }

        async fn clear_all_quote_cache(&self) -> Result<usize> {
            Ok(0)
        }

        async fn cleanup_duplicate_entries(&self) -> Result<ReconcileReport> {
            Ok(ReconcileReport::default())
        }
    }

    fn service(
        repository: MockPortfolioRepository,
        stocks: MockStockService,
    ) -> PortfolioService {
        PortfolioService::new(
            Arc::new(repository),
            Arc::new(stocks),
            Arc::new(FixedClock::new(
                Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap(),
            )),
        )
    }

    fn new_stock(symbol: &str) -> NewPortfolioStock {
        NewPortfolioStock {
            symbol: symbol.to_string(),
            company_name: format!("{} Inc.", symbol),
        }
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[tokio::test]
    async fn test_get_portfolio_creates_empty() {
        let repo = MockPortfolioRepository::new();
        let svc = service(repo.clone(), MockStockService::default());

        let view = svc.get_portfolio("default").await.unwrap();
        assert_eq!(view.user_id, "default");
        assert!(view.stocks.is_empty());
        assert_eq!(view.total_value, Decimal::ZERO);
        assert_eq!(view.total_change_percent, Decimal::ZERO);
        assert!(repo.get_by_user("default").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_stock_uppercases_and_joins_quote() {
        let repo = MockPortfolioRepository::new();
        let svc = service(
            repo,
            MockStockService::with_prices(&[("AAPL", dec!(200), dec!(10))]),
        );

        let view = svc.add_stock("default", new_stock("aapl")).await.unwrap();
        assert_eq!(view.stocks.len(), 1);
        assert_eq!(view.stocks[0].stock.symbol, "AAPL");
        assert_eq!(view.stocks[0].stock.company_name, "aapl Inc.");
        assert_eq!(view.stocks[0].quote.as_ref().unwrap().price, dec!(200));
    }

    #[tokio::test]
    async fn test_add_duplicate_is_conflict() {
        let svc = service(MockPortfolioRepository::new(), MockStockService::default());
        svc.add_stock("default", new_stock("MSFT")).await.unwrap();

        let err = svc.add_stock("default", new_stock("msft")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Portfolio(PortfolioError::StockAlreadyExists(ref s)) if s == "MSFT"
        ));
    }

    #[tokio::test]
    async fn test_add_unique_violation_maps_to_conflict() {
        let repo = MockPortfolioRepository::new();
        *repo.reject_adds.lock().unwrap() = true;
        let svc = service(repo, MockStockService::default());

        let err = svc.add_stock("default", new_stock("TSLA")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Portfolio(PortfolioError::StockAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_add_blank_symbol_is_validation_error() {
        let svc = service(MockPortfolioRepository::new(), MockStockService::default());
        let err = svc.add_stock("default", new_stock("  ")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_remove_stock_case_insensitive() {
        let svc = service(MockPortfolioRepository::new(), MockStockService::default());
        svc.add_stock("default", new_stock("AAPL")).await.unwrap();
        svc.add_stock("default", new_stock("MSFT")).await.unwrap();

        let view = svc.remove_stock("default", "aapl").await.unwrap();
        let symbols: Vec<&str> = view.stocks.iter().map(|s| s.stock.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MSFT"]);
    }

    #[tokio::test]
    async fn test_remove_missing_stock_and_portfolio() {
        let svc = service(MockPortfolioRepository::new(), MockStockService::default());

        let err = svc.remove_stock("default", "AAPL").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Portfolio(PortfolioError::PortfolioNotFound(_))
        ));

        svc.get_portfolio("default").await.unwrap();
        let err = svc.remove_stock("default", "AAPL").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Portfolio(PortfolioError::StockNotFound(ref s)) if s == "AAPL"
        ));
    }

    #[tokio::test]
    async fn test_portfolio_timestamps_follow_clock() {
        let start = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        let clock = Arc::new(FixedClock::new(start));
        let repo = MockPortfolioRepository::new();
        let svc = PortfolioService::new(
            Arc::new(repo.clone()),
            Arc::new(MockStockService::default()),
            clock.clone(),
        );

        svc.add_stock("default", new_stock("AAPL")).await.unwrap();
        let created = repo.get_by_user("default").unwrap().unwrap();
        assert_eq!(created.created_at, start);
        assert_eq!(created.updated_at, start);

        clock.advance(Duration::hours(3));
        svc.remove_stock("default", "AAPL").await.unwrap();
        let portfolio = repo.get_by_user("default").unwrap().unwrap();
        assert_eq!(portfolio.created_at, start);
        assert_eq!(portfolio.updated_at, start + Duration::hours(3));
    }

    #[tokio::test]
    async fn test_totals_skip_missing_quotes() {
        let svc = service(
            MockPortfolioRepository::new(),
            MockStockService::with_prices(&[
                ("AAA", dec!(100), dec!(10)),
                ("CCC", dec!(50), dec!(-5)),
            ]),
        );
        for symbol in ["AAA", "BBB", "CCC"] {
            svc.add_stock("default", new_stock(symbol)).await.unwrap();
        }

        let view = svc.get_portfolio("default").await.unwrap();
        assert_eq!(view.stocks.len(), 3);
        assert!(view.stocks[1].quote.is_none());
        assert_eq!(view.total_value, dec!(150));
        assert_eq!(view.total_change, dec!(5));
        // 5 / (150 - 5) * 100
        assert_eq!(
            view.total_change_percent.round_dp(6),
            (dec!(5) / dec!(145) * dec!(100)).round_dp(6)
        );
    }

    #[test]
    fn test_totals_guard_against_zero_base() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        let stock = PortfolioStockWithQuote {
            stock: PortfolioStock {
                symbol: "NEW".to_string(),
                company_name: "New Listing".to_string(),
                added_at: now,
            },
            quote: Some(StockQuote::new("NEW", dec!(10), dec!(10), dec!(0), "New Listing")),
        };
        let view = PortfolioWithQuotes::new("default".to_string(), vec![stock]);
        assert_eq!(view.total_value, dec!(10));
        assert_eq!(view.total_change_percent, Decimal::ZERO);
    }

    #[test]
    fn test_view_serializes_flattened_stock() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        let view = PortfolioWithQuotes::new(
            "default".to_string(),
            vec![PortfolioStockWithQuote {
                stock: PortfolioStock {
                    symbol: "AAPL".to_string(),
                    company_name: "Apple".to_string(),
                    added_at: now,
                },
                quote: None,
            }],
        );
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["userId"], "default");
        assert_eq!(json["stocks"][0]["symbol"], "AAPL");
        assert_eq!(json["stocks"][0]["companyName"], "Apple");
        assert!(json["stocks"][0]["quote"].is_null());
    }
}
