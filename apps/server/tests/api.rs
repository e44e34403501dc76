use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal_macros::dec;
use stockfolio_market_data::{MarketDataError, MarketDataProvider, StockQuote, StockSearchResult};
use stockfolio_server::{api::app_router, build_state_with_provider, config::Config};
use tempfile::TempDir;
use tower::ServiceExt;

/// Serves AAPL and MSFT, throttles LIMIT, knows nothing else.
#[derive(Default)]
struct StubProvider {
    quote_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    fn id(&self) -> &'static str {
        "STUB"
    }

    async fn get_quote(&self, symbol: &str) -> Result<StockQuote, MarketDataError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        match symbol {
            "AAPL" => Ok(StockQuote::new("AAPL", dec!(190), dec!(10), dec!(5.5556), "Apple Inc.")),
            "MSFT" => Ok(StockQuote::new("MSFT", dec!(410), dec!(-10), dec!(-2.381), "Microsoft")),
            "LIMIT" => Err(MarketDataError::RateLimited {
                provider: "STUB".to_string(),
            }),
            other => Err(MarketDataError::SymbolNotFound(other.to_string())),
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<StockSearchResult>, MarketDataError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if query == "apple" {
            Ok((0..6)
                .map(|i| StockSearchResult::new(format!("AP{i}"), format!("Apple {i}"), "NASDAQ", "stock"))
                .collect())
        } else {
            Ok(Vec::new())
        }
    }
}

async fn build_test_router() -> (Router, Arc<StubProvider>, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        ..Config::default()
    };
    let provider = Arc::new(StubProvider::default());
    let state = build_state_with_provider(&config, provider.clone())
        .await
        .unwrap();
    (app_router(state, &config), provider, tmp)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn healthz_works() {
    let (app, _provider, _tmp) = build_test_router().await;
    let response = app
        .oneshot(Request::builder().uri("/api/v1/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn quote_is_served_from_cache_on_second_request() {
    let (app, provider, _tmp) = build_test_router().await;

    let (status, first) = send(&app, Method::GET, "/api/v1/stocks/quote/aapl", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["symbol"], "AAPL");
    assert_eq!(first["companyName"], "Apple Inc.");

    let (status, second) = send(&app, Method::GET, "/api/v1/stocks/quote/AAPL", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(provider.quote_calls.load(Ordering::SeqCst), 1);

    let (_, stats) = send(&app, Method::GET, "/api/v1/stocks/cache/stats", None).await;
    assert_eq!(stats["quoteEntries"], 1);
}

#[tokio::test]
async fn upstream_errors_map_to_statuses() {
    let (app, _provider, _tmp) = build_test_router().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/stocks/quote/ZZZZ", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    let (status, _) = send(&app, Method::GET, "/api/v1/stocks/quote/LIMIT", None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn search_caches_non_empty_results_only() {
    let (app, provider, _tmp) = build_test_router().await;

    let (status, results) = send(&app, Method::GET, "/api/v1/stocks/search?q=apple", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results.as_array().unwrap().len(), 6);

    let (_, again) = send(&app, Method::GET, "/api/v1/stocks/search?query=apple", None).await;
    assert_eq!(results, again);
    assert_eq!(provider.search_calls.load(Ordering::SeqCst), 1);

    let (status, empty) = send(&app, Method::GET, "/api/v1/stocks/search?q=nothing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(empty.as_array().unwrap().is_empty());

    let (_, stats) = send(&app, Method::GET, "/api/v1/stocks/cache/stats", None).await;
    assert_eq!(stats["searchEntries"], 1);
    assert_eq!(stats["searchResults"], 6);

    let (status, _) = send(&app, Method::GET, "/api/v1/stocks/search?q=%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn batch_quotes_skip_failures() {
    let (app, _provider, _tmp) = build_test_router().await;

    let body = serde_json::json!({ "symbols": ["msft", "ZZZZ", "AAPL", "MSFT"] });
    let (status, quotes) = send(&app, Method::POST, "/api/v1/stocks/quotes", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    let symbols: Vec<&str> = quotes
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["symbol"].as_str().unwrap())
        .collect();
    assert_eq!(symbols, vec!["MSFT", "AAPL"]);
}

#[tokio::test]
async fn cache_maintenance_routes() {
    let (app, provider, _tmp) = build_test_router().await;
    send(&app, Method::GET, "/api/v1/stocks/quote/AAPL", None).await;
    send(&app, Method::GET, "/api/v1/stocks/search?q=apple", None).await;

    let (status, body) = send(&app, Method::DELETE, "/api/v1/stocks/cache/symbol/aapl", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);

    send(&app, Method::GET, "/api/v1/stocks/quote/AAPL", None).await;
    assert_eq!(provider.quote_calls.load(Ordering::SeqCst), 2);

    let (_, body) = send(&app, Method::DELETE, "/api/v1/stocks/cache/query/apple", None).await;
    assert_eq!(body["removed"], true);

    let (_, report) = send(&app, Method::POST, "/api/v1/stocks/cache/cleanup-duplicates", None).await;
    assert_eq!(report["duplicatesFound"], 0);

    let (_, body) = send(&app, Method::DELETE, "/api/v1/stocks/cache/old?daysOld=0", None).await;
    assert_eq!(body["removed"], 1);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/stocks/cache/old?daysOld=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/v1/stocks/cache/old?daysOld={}", i64::MAX);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::DELETE, "/api/v1/stocks/cache/quotes", None).await;
    assert_eq!(body["removed"], 0);
}

#[tokio::test]
async fn portfolio_lifecycle() {
    let (app, _provider, _tmp) = build_test_router().await;

    let (status, empty) = send(&app, Method::GET, "/api/v1/portfolio", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["userId"], "default");
    assert!(empty["stocks"].as_array().unwrap().is_empty());

    let add = |symbol: &str| serde_json::json!({ "symbol": symbol, "companyName": "Test" });
    let (status, _) = send(&app, Method::POST, "/api/v1/portfolio/stocks", Some(add("aapl"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, view) = send(&app, Method::POST, "/api/v1/portfolio/stocks", Some(add("MSFT"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["stocks"][0]["symbol"], "AAPL");
    assert_eq!(view["totalValue"], 600.0);
    assert_eq!(view["totalChange"], 0.0);

    let (status, body) = send(&app, Method::POST, "/api/v1/portfolio/stocks", Some(add("Aapl"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 409);

    let (status, view) = send(&app, Method::DELETE, "/api/v1/portfolio/stocks/aapl", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["stocks"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/portfolio/stocks/AAPL", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, "/api/v1/portfolio/stocks/AAPL?userId=someone", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
