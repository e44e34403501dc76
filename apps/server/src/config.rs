use std::{net::SocketAddr, time::Duration};

use stockfolio_core::constants::SEARCH_CACHE_MAX_AGE_DAYS;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Empty disables upstream calls; every cache miss then fails.
    pub fmp_api_key: String,
    pub search_cache_max_age_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            db_path: "./db/app.db".into(),
            cors_allow: vec![
                "http://localhost:3000".into(),
                "http://localhost:5173".into(),
            ],
            request_timeout: Duration::from_millis(30000),
            fmp_api_key: String::new(),
            search_cache_max_age_days: SEARCH_CACHE_MAX_AGE_DAYS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = match std::env::var("SF_LISTEN_ADDR") {
            Ok(addr) => addr.parse().expect("Invalid SF_LISTEN_ADDR"),
            Err(_) => defaults.listen_addr,
        };
        let db_path = std::env::var("SF_DB_PATH").unwrap_or(defaults.db_path);
        let cors_allow = match std::env::var("SF_CORS_ALLOW_ORIGINS") {
            Ok(origins) => origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.cors_allow,
        };
        let timeout_ms: u64 = std::env::var("SF_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let fmp_api_key = std::env::var("FMP_API_KEY").unwrap_or_default();
        let search_cache_max_age_days = std::env::var("SF_SEARCH_CACHE_MAX_AGE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|days: &i64| *days > 0)
            .unwrap_or(defaults.search_cache_max_age_days);

        Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            fmp_api_key,
            search_cache_max_age_days,
        }
    }
}
