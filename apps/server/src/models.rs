use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use tickerlift_core::enrichment::{EnrichmentReport, SymbolLookup};

/// Data source reported in lookup responses.
const SOURCE: &str = "finnhub";

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SymbolResponse {
    pub company_name: String,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub success: bool,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl From<SymbolLookup> for SymbolResponse {
    fn from(lookup: SymbolLookup) -> Self {
        Self {
            company_name: lookup.name,
            symbol: lookup.symbol,
            description: lookup.description,
            success: lookup.resolved,
            source: SOURCE.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResponse {
    pub message: String,
    pub output_file: String,
    pub rows_processed: usize,
    pub rows_updated: usize,
    pub rows_failed: usize,
    pub success_rate: f64,
    pub processing_time_seconds: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<EnrichmentReport> for EnrichmentResponse {
    fn from(report: EnrichmentReport) -> Self {
        let stats = report.statistics;
        Self {
            message: "Symbol enrichment completed.".to_string(),
            output_file: report.output_file,
            rows_processed: stats.rows_processed,
            rows_updated: stats.rows_updated,
            rows_failed: stats.rows_failed,
            success_rate: stats.success_rate,
            processing_time_seconds: stats.elapsed_seconds,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub rate_limit_remaining: u32,
}
