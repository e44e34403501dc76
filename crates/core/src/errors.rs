//! Core error types for the Stockfolio application.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::ParseError as ChronoParseError;
use stockfolio_market_data::MarketDataError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the application.
///
/// Database-specific errors are wrapped in string form to keep this type
/// database-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Stock lookup failed: {0}")]
    Stock(#[from] StockError),

    #[error("Portfolio operation failed: {0}")]
    Portfolio(#[from] PortfolioError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// Every variant means the cache or portfolio store could not serve the
/// request. These are propagated to the caller and never replaced by a
/// local fallback.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A unique constraint was violated (e.g., duplicate key).
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored payload could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Failures surfaced by the upstream market data provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StockError {
    /// The provider has no record of the symbol. Never cached or retried.
    #[error("Stock symbol {0} not found")]
    NotFound(String),

    /// The provider throttled the request. Callers should back off.
    #[error("Rate limited by provider {0}")]
    RateLimited(String),

    /// Any other provider failure (network, malformed response, bad key).
    #[error("Market data provider failed: {0}")]
    UpstreamFailure(String),
}

impl From<MarketDataError> for StockError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::SymbolNotFound(symbol) => StockError::NotFound(symbol),
            MarketDataError::RateLimited { provider } => StockError::RateLimited(provider),
            other => StockError::UpstreamFailure(other.to_string()),
        }
    }
}

impl From<MarketDataError> for Error {
    fn from(err: MarketDataError) -> Self {
        Error::Stock(StockError::from(err))
    }
}

/// Watchlist errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortfolioError {
    #[error("Stock {0} already exists in portfolio")]
    StockAlreadyExists(String),

    #[error("Stock {0} not found in portfolio")]
    StockNotFound(String),

    #[error("Portfolio not found for user {0}")]
    PortfolioNotFound(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
