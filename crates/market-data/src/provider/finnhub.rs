//! Finnhub symbol search provider implementation.
//!
//! This module provides symbol search via the Finnhub `/search` endpoint.
//! Finnhub free tier is limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::errors::LookupError;
use crate::models::Candidate;
use crate::provider::SymbolSearchProvider;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

/// Default network timeout for a single search call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /search endpoint
#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Search results
    result: Vec<SearchItem>,
    // Note: count field exists but we use result.len() instead
}

/// Individual search result item.
///
/// `symbol` is required; an item without it fails the whole response
/// parse, which surfaces as a provider error (fail closed). Everything
/// else is absent for some listings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    /// Full description/name
    description: Option<String>,
    /// Display symbol
    display_symbol: Option<String>,
    /// Symbol for API calls
    symbol: String,
    /// Security type (e.g., "Common Stock", "ETF")
    #[serde(rename = "type")]
    security_type: Option<String>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub symbol search provider.
///
/// Free tier is limited to 60 API calls per minute; the shared
/// [`RateLimiter`](crate::RateLimiter) enforces that budget upstream of
/// this type.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a provider with a custom network timeout.
    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Override the base URL (tests point this at a local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Make a GET request to the Finnhub API.
    async fn fetch(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, LookupError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self.client.get(&url);

        // Add API key as header (more secure than query param)
        request = request.header("X-Finnhub-Token", &self.api_key);

        for (key, value) in params {
            request = request.query(&[(key, value)]);
        }

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout {
                    provider: PROVIDER_ID.to_string(),
                }
            } else {
                LookupError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    status: None,
                    message: format!("Request failed: {}", e),
                }
            }
        })?;

        let status = response.status();

        // Handle rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // Handle unauthorized (invalid API key)
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LookupError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                status: Some(status.as_u16()),
                message: "Invalid or missing API key".to_string(),
            });
        }

        // Handle forbidden (API key quota exceeded)
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(LookupError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            // Try to parse error message
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                if let Some(error_msg) = error_resp.error {
                    return Err(LookupError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        status: Some(status.as_u16()),
                        message: error_msg,
                    });
                }
            }

            return Err(LookupError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                status: Some(status.as_u16()),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        response.text().await.map_err(|e| LookupError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            status: None,
            message: format!("Failed to read response: {}", e),
        })
    }

    fn parse_search_response(text: &str) -> Result<Vec<Candidate>, LookupError> {
        let response: SearchResponse =
            serde_json::from_str(text).map_err(|e| LookupError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                status: None,
                message: format!("Failed to parse search response: {}", e),
            })?;

        Ok(response
            .result
            .into_iter()
            .map(|item| Candidate {
                symbol: item.symbol,
                display_symbol: item.display_symbol,
                description: item.description,
                kind: item.security_type.as_deref().map(map_security_type),
            })
            .collect())
    }
}

#[async_trait]
impl SymbolSearchProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError> {
        let params = [("q", query)];
        let text = self.fetch("/search", &params).await?;

        let candidates = Self::parse_search_response(&text)?;

        debug!(
            "Finnhub: found {} search results for '{}'",
            candidates.len(),
            query
        );

        Ok(candidates)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Map Finnhub security type to our security kind.
fn map_security_type(finnhub_type: &str) -> String {
    match finnhub_type.to_lowercase().as_str() {
        "common stock" | "stock" => "Stock".to_string(),
        "etf" | "etp" => "ETF".to_string(),
        "mutual fund" | "fund" => "Mutual Fund".to_string(),
        "adr" | "american depositary receipt" => "ADR".to_string(),
        "reit" => "REIT".to_string(),
        "warrant" => "Warrant".to_string(),
        "preferred stock" | "preferred" => "Preferred Stock".to_string(),
        _ => finnhub_type.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
