//! Rate-limited front door for symbol lookups.

use std::sync::Arc;

use tracing::debug;

use crate::errors::LookupError;
use crate::models::Candidate;
use crate::provider::SymbolSearchProvider;
use crate::rate_limiter::RateLimiter;

/// Client that performs one provider query per call, within the shared
/// rate-limit budget.
///
/// One permit is consumed per attempt, success or failure; an invalid
/// query is rejected before any permit is spent. Retry policy, if any,
/// belongs to callers.
#[derive(Clone)]
pub struct SymbolLookupClient {
    provider: Arc<dyn SymbolSearchProvider>,
    limiter: Arc<RateLimiter>,
}

impl SymbolLookupClient {
    /// Create a client over a provider and a shared rate limiter.
    pub fn new(provider: Arc<dyn SymbolSearchProvider>, limiter: Arc<RateLimiter>) -> Self {
        Self { provider, limiter }
    }

    /// Look up symbol candidates for a query string.
    ///
    /// Returns the provider's ranked candidate list; an empty list means
    /// the provider found no matches and is a successful outcome.
    pub async fn lookup(&self, query: &str) -> Result<Vec<Candidate>, LookupError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LookupError::InvalidQuery(
                "query is empty after trimming".to_string(),
            ));
        }

        self.limiter.acquire().await;

        debug!("Looking up '{}' via {}", query, self.provider.id());
        self.provider.search(query).await
    }

    /// The shared rate limiter, for budget reporting.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiter::RateLimitConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct StubProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubProvider {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl SymbolSearchProvider for StubProvider {
        fn id(&self) -> &'static str {
            "STUB"
        }

        async fn search(&self, _query: &str) -> Result<Vec<Candidate>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(LookupError::ProviderError {
                    provider: "STUB".to_string(),
                    status: Some(500),
                    message: "boom".to_string(),
                })
            } else {
                Ok(vec![Candidate::new("AAPL")])
            }
        }
    }

    fn limiter(max_requests: u32) -> Arc<RateLimiter> {
        Arc::new(RateLimiter::with_config(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        }))
    }

    #[tokio::test]
    async fn test_lookup_returns_candidates() {
        let provider = StubProvider::new(false);
        let client = SymbolLookupClient::new(provider.clone(), limiter(10));

        let candidates = client.lookup("Apple").await.unwrap();
        assert_eq!(candidates[0].symbol, "AAPL");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_query_consumes_no_permit() {
        let provider = StubProvider::new(false);
        let client = SymbolLookupClient::new(provider.clone(), limiter(10));

        let err = client.lookup("   ").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidQuery(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.limiter().remaining(), 10);
    }

    #[tokio::test]
    async fn test_query_is_trimmed_before_dispatch() {
        let provider = StubProvider::new(false);
        let client = SymbolLookupClient::new(provider.clone(), limiter(10));

        client.lookup("  Apple  ").await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_attempt_still_spends_permit() {
        let provider = StubProvider::new(true);
        let client = SymbolLookupClient::new(provider.clone(), limiter(10));

        let err = client.lookup("Apple").await.unwrap_err();
        assert!(matches!(err, LookupError::ProviderError { .. }));
        assert_eq!(client.limiter().remaining(), 9);
    }
}
