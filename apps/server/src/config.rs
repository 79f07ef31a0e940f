use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use tickerlift_core::constants::{DEFAULT_MAX_FILE_SIZE_MB, DEFAULT_PAGE_SIZE};
use tickerlift_core::enrichment::default_concurrency;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub finnhub_api_key: String,
    pub rate_limit_per_minute: u32,
    pub max_workers: usize,
    pub page_size: usize,
    pub data_dir: String,
    pub max_file_size_mb: u64,
    pub lookup_timeout: Duration,
    pub request_timeout: Duration,
    pub cors_allow: Vec<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("TL_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid TL_LISTEN_ADDR")?;
        let finnhub_api_key =
            std::env::var("TL_FINNHUB_API_KEY").context("TL_FINNHUB_API_KEY must be set")?;
        let rate_limit_per_minute: u32 = std::env::var("TL_RATE_LIMIT_PER_MINUTE")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .unwrap_or(60);
        let max_workers: usize = std::env::var("TL_MAX_WORKERS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_concurrency)
            .max(1);
        let page_size: usize = std::env::var("TL_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .max(1);
        let data_dir = std::env::var("TL_DATA_DIR").unwrap_or_else(|_| "data".into());
        let max_file_size_mb: u64 = std::env::var("TL_MAX_FILE_SIZE_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);
        let lookup_timeout_secs: u64 = std::env::var("TL_LOOKUP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .unwrap_or(30);
        let timeout_ms: u64 = std::env::var("TL_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        let cors_allow = std::env::var("TL_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            listen_addr,
            finnhub_api_key,
            rate_limit_per_minute,
            max_workers,
            page_size,
            data_dir,
            max_file_size_mb,
            lookup_timeout: Duration::from_secs(lookup_timeout_secs),
            request_timeout: Duration::from_millis(timeout_ms),
            cors_allow,
        })
    }
}
