//! Error types for symbol lookup operations.

use thiserror::Error;

/// Errors that can occur while looking up symbols.
///
/// Row-level handling in the enrichment pipeline converts these into
/// per-row outcomes; nothing in this crate retries on its own.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The query was empty after trimming.
    /// Raised before any rate-limit permit is consumed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The provider rate limited the request (HTTP 429/403), or the
    /// local budget was exhausted in fail-fast mode.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider returned a non-success status or an unusable body.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// HTTP status code, when one was received
        status: Option<u16>,
        /// The error message from the provider
        message: String,
    },

    /// A network error occurred below the HTTP layer.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl LookupError {
    /// Whether waiting and trying again could plausibly succeed.
    ///
    /// Retry policy belongs to callers; this only classifies.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_transient() {
        let error = LookupError::RateLimited {
            provider: "FINNHUB".to_string(),
        };
        assert!(error.is_transient());
    }

    #[test]
    fn test_timeout_is_transient() {
        let error = LookupError::Timeout {
            provider: "FINNHUB".to_string(),
        };
        assert!(error.is_transient());
    }

    #[test]
    fn test_invalid_query_is_terminal() {
        let error = LookupError::InvalidQuery("".to_string());
        assert!(!error.is_transient());
    }

    #[test]
    fn test_provider_error_is_terminal() {
        let error = LookupError::ProviderError {
            provider: "FINNHUB".to_string(),
            status: Some(500),
            message: "Internal server error".to_string(),
        };
        assert!(!error.is_transient());
    }

    #[test]
    fn test_error_display() {
        let error = LookupError::RateLimited {
            provider: "FINNHUB".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: FINNHUB");

        let error = LookupError::ProviderError {
            provider: "FINNHUB".to_string(),
            status: Some(401),
            message: "Invalid API key".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: FINNHUB - Invalid API key"
        );
    }
}
