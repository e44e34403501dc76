use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use stockfolio_core::constants::DEFAULT_USER_ID;
use stockfolio_core::portfolio::{NewPortfolioStock, PortfolioWithQuotes};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserParams {
    user_id: Option<String>,
}

impl UserParams {
    fn user_id(&self) -> &str {
        self.user_id.as_deref().unwrap_or(DEFAULT_USER_ID)
    }
}

async fn get_portfolio(
    Query(params): Query<UserParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioWithQuotes>> {
    let view = state.portfolio_service.get_portfolio(params.user_id()).await?;
    Ok(Json(view))
}

async fn add_stock(
    Query(params): Query<UserParams>,
    State(state): State<Arc<AppState>>,
    Json(stock): Json<NewPortfolioStock>,
) -> ApiResult<(StatusCode, Json<PortfolioWithQuotes>)> {
    let view = state
        .portfolio_service
        .add_stock(params.user_id(), stock)
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn remove_stock(
    Path(symbol): Path<String>,
    Query(params): Query<UserParams>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioWithQuotes>> {
    let view = state
        .portfolio_service
        .remove_stock(params.user_id(), &symbol)
        .await?;
    Ok(Json(view))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(get_portfolio))
        .route("/portfolio/stocks", post(add_stock))
        .route("/portfolio/stocks/{symbol}", delete(remove_stock))
}
