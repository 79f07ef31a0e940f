//! Enrichment service: the surface the HTTP layer calls.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::enrichment::engine::{CancelToken, EnrichmentEngine, RunOptions};
use crate::enrichment::enrichment_traits::{EnrichmentServiceTrait, RowResolverTrait};
use crate::enrichment::{EnrichmentReport, RunStatistics, SymbolLookup};
use crate::errors::Result;
use crate::files::FileStore;
use crate::tables::{NameTable, OutputTable};

/// Orchestrates single lookups and the CSV upload pipeline.
pub struct EnrichmentService {
    resolver: Arc<dyn RowResolverTrait>,
    engine: EnrichmentEngine,
    file_store: Arc<FileStore>,
    options: RunOptions,
}

impl EnrichmentService {
    pub fn new(
        resolver: Arc<dyn RowResolverTrait>,
        file_store: Arc<FileStore>,
        options: RunOptions,
    ) -> Self {
        let engine = EnrichmentEngine::new(resolver.clone());
        Self {
            resolver,
            engine,
            file_store,
            options,
        }
    }

    /// Parse a CSV stream and enrich it in memory.
    pub async fn enrich_table<R: io::Read>(
        &self,
        reader: R,
        cancel: &CancelToken,
    ) -> Result<(OutputTable, RunStatistics)> {
        let table = NameTable::from_reader(reader)?;
        let run = self.engine.run(table.rows(), &self.options, cancel).await?;
        let statistics = run.statistics.clone();
        let output = table.with_symbols(&run.outcomes)?;
        Ok((output, statistics))
    }
}

#[async_trait]
impl EnrichmentServiceTrait for EnrichmentService {
    async fn lookup_company(&self, name: &str) -> SymbolLookup {
        match self.resolver.select(name).await {
            Ok(candidate) => {
                info!("Resolved '{}' to {}", name, candidate.symbol);
                SymbolLookup {
                    name: name.to_string(),
                    symbol: Some(candidate.symbol),
                    description: candidate.description,
                    resolved: true,
                    error: None,
                }
            }
            Err(error) => {
                warn!("Could not resolve '{}': {}", name, error);
                SymbolLookup {
                    name: name.to_string(),
                    symbol: None,
                    description: None,
                    resolved: false,
                    error: Some(error),
                }
            }
        }
    }

    async fn enrich_upload(
        &self,
        original_name: &str,
        bytes: &[u8],
        cancel: &CancelToken,
    ) -> Result<EnrichmentReport> {
        let stored = self.file_store.save_upload(original_name, bytes)?;

        let (output, statistics) = self.enrich_table(bytes, cancel).await?;

        // Written only after the run completes; a cancelled or failed
        // run leaves no output file behind
        let output_file = FileStore::output_filename(&stored.filename);
        let file = self.file_store.create(&output_file)?;
        output.write(file)?;

        info!(
            rows = statistics.rows_processed,
            updated = statistics.rows_updated,
            failed = statistics.rows_failed,
            "Wrote enriched table to '{}'",
            output_file
        );

        Ok(EnrichmentReport {
            output_file,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::RowError;
    use crate::errors::Error;
    use std::fs;
    use tickerlift_market_data::Candidate;

    /// Resolver keyed on the first token, like the real policy.
    struct StubResolver {
        cancel_all: Option<CancelToken>,
    }

    #[async_trait]
    impl RowResolverTrait for StubResolver {
        async fn select(&self, name: &str) -> std::result::Result<Candidate, RowError> {
            if let Some(cancel) = &self.cancel_all {
                cancel.cancel();
            }
            match name.split_whitespace().next() {
                None => Err(RowError::EmptyName),
                Some("Apple") => {
                    Ok(Candidate::new("AAPL").with_description("APPLE INC"))
                }
                Some(other) => Err(RowError::NotFound(other.to_string())),
            }
        }
    }

    fn service(dir: &tempfile::TempDir, cancel_all: Option<CancelToken>) -> EnrichmentService {
        let file_store = Arc::new(FileStore::new(dir.path()).unwrap());
        EnrichmentService::new(
            Arc::new(StubResolver { cancel_all }),
            file_store,
            RunOptions {
                concurrency: 2,
                page_size: 100,
                inter_call_delay: None,
            },
        )
    }

    #[tokio::test]
    async fn test_lookup_company_success() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir, None);

        let lookup = service.lookup_company("Apple Inc").await;

        assert!(lookup.resolved);
        assert_eq!(lookup.symbol.as_deref(), Some("AAPL"));
        assert_eq!(lookup.description.as_deref(), Some("APPLE INC"));
    }

    #[tokio::test]
    async fn test_lookup_company_failure_is_data() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir, None);

        let lookup = service.lookup_company("Unknownzzz Corp").await;

        assert!(!lookup.resolved);
        assert_eq!(lookup.symbol, None);
        assert!(matches!(lookup.error, Some(RowError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_enrich_upload_writes_enriched_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir, None);

        let csv = b"Name,Country\nApple Inc,US\nUnknownzzz Corp,US\n";
        let report = service
            .enrich_upload("companies.csv", csv, &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(report.statistics.rows_processed, 2);
        assert_eq!(report.statistics.rows_updated, 1);
        assert!(report.output_file.ends_with("_enriched.csv"));

        let written = fs::read_to_string(dir.path().join(&report.output_file)).unwrap();
        assert_eq!(
            written,
            "Name,Country,Symbol\nApple Inc,US,AAPL\nUnknownzzz Corp,US,\n"
        );
    }

    #[tokio::test]
    async fn test_enrich_upload_rejects_missing_name_column() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&dir, None);

        let err = service
            .enrich_upload("companies.csv", b"Company\nApple Inc\n", &CancelToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Table(_)));
    }

    #[tokio::test]
    async fn test_cancelled_upload_writes_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();
        let service = service(&dir, Some(cancel.clone()));

        let csv = b"Name\nApple Inc\nApple Inc\nApple Inc\n";
        let err = service
            .enrich_upload("companies.csv", csv, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        let outputs: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with("_enriched.csv"))
            .collect();
        assert!(outputs.is_empty());
    }
}
