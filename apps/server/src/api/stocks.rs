use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use stockfolio_market_data::{StockQuote, StockSearchResult};

#[derive(Deserialize)]
struct SearchParams {
    #[serde(alias = "q")]
    query: String,
}

#[derive(Deserialize)]
struct BatchQuoteRequest {
    symbols: Vec<String>,
}

async fn get_quote(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StockQuote>> {
    let quote = state.stock_service.get_quote(&symbol).await?;
    Ok(Json(quote))
}

async fn search(
    Query(params): Query<SearchParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<StockSearchResult>>> {
    let results = state.stock_service.search(&params.query).await?;
    Ok(Json(results))
}

async fn get_quotes(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BatchQuoteRequest>,
) -> ApiResult<Json<Vec<StockQuote>>> {
    let quotes = state.stock_service.get_multiple_quotes(&body.symbols).await?;
    Ok(Json(quotes))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stocks/quote/{symbol}", get(get_quote))
        .route("/stocks/search", get(search))
        .route("/stocks/quotes", post(get_quotes))
}
