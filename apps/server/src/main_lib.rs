use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use tickerlift_core::enrichment::{
    EnrichmentService, EnrichmentServiceTrait, RowResolver, RowResolverTrait, RunOptions,
};
use tickerlift_core::files::FileStore;
use tickerlift_market_data::{
    FinnhubProvider, RateLimitConfig, RateLimiter, SymbolLookupClient, SymbolSearchProvider,
};

pub struct AppState {
    pub enrichment_service: Arc<dyn EnrichmentServiceTrait + Send + Sync>,
    pub file_store: Arc<FileStore>,
    pub rate_limiter: Arc<RateLimiter>,
    pub started_at: Instant,
}

pub fn init_tracing() {
    let log_format = std::env::var("TL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    // One limiter instance for the whole process; every worker contends
    // for the same budget
    let rate_limiter = Arc::new(RateLimiter::with_config(RateLimitConfig {
        max_requests: config.rate_limit_per_minute,
        window: std::time::Duration::from_secs(60),
    }));

    let provider: Arc<dyn SymbolSearchProvider> = Arc::new(FinnhubProvider::with_timeout(
        config.finnhub_api_key.clone(),
        config.lookup_timeout,
    ));
    let lookup_client = SymbolLookupClient::new(provider, rate_limiter.clone());
    let resolver: Arc<dyn RowResolverTrait> = Arc::new(RowResolver::new(lookup_client));

    let file_store = Arc::new(
        FileStore::new(&config.data_dir)?.with_max_size_mb(config.max_file_size_mb),
    );
    tracing::info!("File store rooted at '{}'", config.data_dir);

    let run_options = RunOptions {
        concurrency: config.max_workers,
        page_size: config.page_size,
        inter_call_delay: None,
    };
    tracing::info!(
        workers = run_options.concurrency,
        page_size = run_options.page_size,
        rate_limit = config.rate_limit_per_minute,
        "Enrichment pipeline configured"
    );

    let enrichment_service: Arc<dyn EnrichmentServiceTrait + Send + Sync> = Arc::new(
        EnrichmentService::new(resolver, file_store.clone(), run_options),
    );

    Ok(Arc::new(AppState {
        enrichment_service,
        file_store,
        rate_limiter,
        started_at: Instant::now(),
    }))
}
