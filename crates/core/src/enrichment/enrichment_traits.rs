//! Traits at the enrichment seams.

use async_trait::async_trait;
use tickerlift_market_data::Candidate;

use crate::enrichment::{
    CancelToken, EnrichmentReport, InputRow, RowError, RowOutcome, SymbolLookup,
};
use crate::errors::Result;

/// Trait for resolving one free-text company name to at most one symbol.
#[async_trait]
pub trait RowResolverTrait: Send + Sync {
    /// Apply the full selection policy to a raw company name and return
    /// the chosen candidate, or the typed reason none was chosen.
    async fn select(&self, name: &str) -> std::result::Result<Candidate, RowError>;

    /// Resolve one input row into its terminal outcome. Never fails at
    /// the Result level; failures are data inside the outcome.
    async fn resolve(&self, row: InputRow) -> RowOutcome {
        match self.select(&row.name).await {
            Ok(candidate) => RowOutcome::success(row.index, row.name, candidate.symbol),
            Err(error) => RowOutcome::failure(row.index, row.name, error),
        }
    }
}

/// Trait for enrichment service operations.
#[async_trait]
pub trait EnrichmentServiceTrait: Send + Sync {
    /// Look up one company name. Failures are reported inside the
    /// result, mirroring per-row semantics.
    async fn lookup_company(&self, name: &str) -> SymbolLookup;

    /// Store an uploaded CSV, enrich every row, and write the enriched
    /// table next to it. The output file exists only for completed runs.
    async fn enrich_upload(
        &self,
        original_name: &str,
        bytes: &[u8],
        cancel: &CancelToken,
    ) -> Result<EnrichmentReport>;
}
