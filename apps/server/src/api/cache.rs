use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stockfolio_core::constants::DEFAULT_CACHE_EVICTION_DAYS;
use stockfolio_core::stocks::{CacheStats, ReconcileReport};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearOldParams {
    days_old: Option<i64>,
}

#[derive(Serialize)]
struct RemovedCount {
    removed: usize,
}

#[derive(Serialize)]
struct Invalidated {
    removed: bool,
}

async fn get_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<CacheStats>> {
    let stats = state.stock_service.get_cache_stats()?;
    Ok(Json(stats))
}

async fn clear_old(
    Query(params): Query<ClearOldParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RemovedCount>> {
    let days_old = params.days_old.unwrap_or(DEFAULT_CACHE_EVICTION_DAYS);
    let removed = state.stock_service.clear_old_cache_entries(days_old).await?;
    Ok(Json(RemovedCount { removed }))
}

async fn clear_query(
    Path(query): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Invalidated>> {
    let removed = state.stock_service.clear_cache_for_query(&query).await?;
    Ok(Json(Invalidated { removed }))
}

async fn clear_symbol(
    Path(symbol): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Invalidated>> {
    let removed = state.stock_service.clear_cache_for_symbol(&symbol).await?;
    Ok(Json(Invalidated { removed }))
}

async fn clear_quotes(State(state): State<Arc<AppState>>) -> ApiResult<Json<RemovedCount>> {
    let removed = state.stock_service.clear_all_quote_cache().await?;
    Ok(Json(RemovedCount { removed }))
}

async fn cleanup_duplicates(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ReconcileReport>> {
    let report = state.stock_service.cleanup_duplicate_entries().await?;
    Ok(Json(report))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stocks/cache/stats", get(get_stats))
        .route("/stocks/cache/old", delete(clear_old))
        .route("/stocks/cache/query/{query}", delete(clear_query))
        .route("/stocks/cache/symbol/{symbol}", delete(clear_symbol))
        .route("/stocks/cache/quotes", delete(clear_quotes))
        .route("/stocks/cache/cleanup-duplicates", post(cleanup_duplicates))
}
