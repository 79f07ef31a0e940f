//! Row resolver: one company name in, at most one symbol out.

use async_trait::async_trait;
use tickerlift_market_data::{Candidate, SymbolLookupClient};
use tracing::debug;

use crate::enrichment::enrichment_traits::RowResolverTrait;
use crate::enrichment::RowError;

/// Maps a free-text company name to a symbol via the lookup client.
///
/// Query derivation: the first whitespace-delimited token of the name.
/// Providers do prefix/keyword matching, so the first token is treated
/// as the canonical seed term ("Berkshire Hathaway Inc." queries
/// "Berkshire"). Selection: always the provider's first candidate - a
/// deliberate simplification with no disambiguation by market or
/// region, so a secondary exchange listing can win when the provider
/// ranks it first.
pub struct RowResolver {
    client: SymbolLookupClient,
}

impl RowResolver {
    pub fn new(client: SymbolLookupClient) -> Self {
        Self { client }
    }

    /// First whitespace-delimited token, or None for a blank name.
    fn derive_query(name: &str) -> Option<&str> {
        name.split_whitespace().next()
    }
}

#[async_trait]
impl RowResolverTrait for RowResolver {
    async fn select(&self, name: &str) -> Result<Candidate, RowError> {
        let query = Self::derive_query(name).ok_or(RowError::EmptyName)?;

        let candidates = self.client.lookup(query).await?;

        debug!("{} candidates for query '{}'", candidates.len(), query);

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| RowError::NotFound(query.to_string()))
    }
}
