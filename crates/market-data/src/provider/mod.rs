//! Symbol search providers.

pub mod finnhub;

use async_trait::async_trait;

use crate::errors::LookupError;
use crate::models::Candidate;

/// Trait implemented by symbol search providers.
///
/// One call, one network round trip: given a query string, return the
/// provider's ranked candidate list. Zero matches is a successful empty
/// list, not an error. Rate limiting is the caller's concern.
#[async_trait]
pub trait SymbolSearchProvider: Send + Sync {
    /// Stable identifier for this provider (e.g., "FINNHUB").
    fn id(&self) -> &'static str;

    /// Search for symbols matching the query.
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, LookupError>;
}
