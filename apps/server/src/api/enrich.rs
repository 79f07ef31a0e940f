use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use tickerlift_core::enrichment::CancelToken;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{EnrichmentResponse, SymbolResponse},
};

#[derive(serde::Deserialize)]
struct LookupQuery {
    #[serde(rename = "companyName")]
    company_name: String,
}

#[utoipa::path(get, path = "/api/v1/lookup", responses((status = 200, body = SymbolResponse)))]
pub async fn lookup_single_company(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<SymbolResponse>> {
    let name = query.company_name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest(
            "companyName must not be empty".to_string(),
        ));
    }

    info!("Single company lookup: {}", name);
    let lookup = state.enrichment_service.lookup_company(&name).await;
    Ok(Json(SymbolResponse::from(lookup)))
}

#[utoipa::path(post, path = "/api/v1/enrich/upload", responses((status = 200, body = EnrichmentResponse)))]
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<EnrichmentResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

        info!("CSV upload: {} ({} bytes)", filename, bytes.len());
        let cancel = CancelToken::new();
        let report = state
            .enrichment_service
            .enrich_upload(&filename, &bytes, &cancel)
            .await?;

        return Ok(Json(EnrichmentResponse::from(report)));
    }

    Err(ApiError::BadRequest(
        "multipart field 'file' is required".to_string(),
    ))
}

#[utoipa::path(get, path = "/api/v1/enrich/download/{filename}", responses((status = 200, description = "CSV file")))]
pub async fn download_enriched_csv(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<impl IntoResponse> {
    // Tolerate a missing extension in the requested name
    let filename = if filename.to_ascii_lowercase().ends_with(".csv") {
        filename
    } else {
        format!("{filename}.csv")
    };

    let path = state.file_store.resolve(&filename)?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read '{}': {e}", filename)))?;

    info!("CSV download: {}", filename);
    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/lookup", get(lookup_single_company))
        .route("/enrich/upload", post(upload_csv))
        .route("/enrich/download/{filename}", get(download_enriched_csv))
}
