use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stockfolio_core::errors::{Error as CoreError, PortfolioError, StockError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Stock(StockError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Stock(StockError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
        CoreError::Stock(StockError::UpstreamFailure(_)) => StatusCode::BAD_GATEWAY,
        CoreError::Portfolio(PortfolioError::StockAlreadyExists(_)) => StatusCode::CONFLICT,
        CoreError::Portfolio(_) => StatusCode::NOT_FOUND,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Core(e) => core_status(e),
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use stockfolio_core::errors::{DatabaseError, ValidationError};

    fn status_of(err: CoreError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_stock_errors_map_to_upstream_statuses() {
        assert_eq!(
            status_of(StockError::NotFound("ZZZZ".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(StockError::RateLimited("FMP".into()).into()),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of(StockError::UpstreamFailure("boom".into()).into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_store_outage_is_service_unavailable() {
        assert_eq!(
            status_of(DatabaseError::ConnectionFailed("down".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_portfolio_and_validation_statuses() {
        assert_eq!(
            status_of(PortfolioError::StockAlreadyExists("AAPL".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(PortfolioError::StockNotFound("AAPL".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ValidationError::MissingField("symbol".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }
}
