mod enrich;
mod health;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    main_lib::AppState,
    models::{EnrichmentResponse, HealthResponse, SymbolResponse},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::health_status,
        enrich::lookup_single_company,
        enrich::upload_csv,
        enrich::download_enriched_csv,
    ),
    components(schemas(SymbolResponse, EnrichmentResponse, HealthResponse)),
    tags((name = "tickerlift"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .map(|o| o.parse().unwrap())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    // Multipart bodies carry some framing overhead beyond the file itself
    let body_limit = (config.max_file_size_mb * 1024 * 1024 + 64 * 1024) as usize;

    let api = Router::new().merge(health::router()).merge(enrich::router());

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
