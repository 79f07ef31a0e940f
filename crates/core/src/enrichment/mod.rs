//! Enrichment module - domain models, services, and traits.
//!
//! The pipeline, leaf to root: a [`RowResolver`] maps one company name
//! to at most one symbol through the rate-limited lookup client; the
//! [`EnrichmentEngine`] fans resolution out over every row of an input
//! table and reassembles outcomes in input order; the
//! [`EnrichmentService`] ties the engine to CSV tables and stored files.

mod engine;
mod enrichment_model;
mod enrichment_service;
mod enrichment_traits;
mod resolver;

pub use engine::{default_concurrency, CancelToken, EnrichmentEngine, RunOptions};
pub use enrichment_model::{
    EnrichmentReport, EnrichmentRun, InputRow, RowError, RowOutcome, RunStatistics, SymbolLookup,
};
pub use enrichment_service::EnrichmentService;
pub use enrichment_traits::{EnrichmentServiceTrait, RowResolverTrait};
pub use resolver::RowResolver;
