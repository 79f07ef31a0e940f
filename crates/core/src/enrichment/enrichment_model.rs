//! Domain models for the enrichment pipeline.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tickerlift_market_data::LookupError;

/// One row of the input table. Immutable once read; `index` is the
/// 0-based ordinal of the row and stays stable for the whole run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputRow {
    pub index: usize,
    pub name: String,
}

impl InputRow {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Why a single row failed to resolve.
///
/// These are data, not exceptions: the engine records them per row and
/// keeps going. Only run-level faults abort a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The company name was empty or whitespace-only. No lookup call is
    /// made for such a row.
    #[error("Company name is empty")]
    EmptyName,

    /// The derived lookup query was rejected before dispatch.
    #[error("Invalid lookup query: {0}")]
    InvalidQuery(String),

    /// The provider returned zero candidates for the query.
    #[error("No symbol found for query '{0}'")]
    NotFound(String),

    /// The lookup budget was exhausted, locally or provider-side.
    #[error("Rate limit budget exhausted")]
    RateLimitExhausted,

    /// The provider call failed (HTTP error, timeout, bad response).
    #[error("Provider failure: {message}")]
    Provider {
        /// Status marker when one applies (e.g., "429", "timeout")
        status: Option<String>,
        message: String,
    },
}

impl From<LookupError> for RowError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::InvalidQuery(query) => Self::InvalidQuery(query),
            LookupError::RateLimited { .. } => Self::RateLimitExhausted,
            LookupError::Timeout { provider } => Self::Provider {
                status: Some("timeout".to_string()),
                message: format!("{} request timed out", provider),
            },
            LookupError::ProviderError {
                status, message, ..
            } => Self::Provider {
                status: status.map(|s| s.to_string()),
                message,
            },
            LookupError::Network(err) => Self::Provider {
                status: None,
                message: err.to_string(),
            },
        }
    }
}

/// Terminal result of resolving one input row.
///
/// Exactly one outcome exists per input row; `resolved` is true iff a
/// symbol was selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowOutcome {
    pub index: usize,
    pub name: String,
    pub symbol: Option<String>,
    pub resolved: bool,
    pub error: Option<RowError>,
}

impl RowOutcome {
    /// A row that resolved to a symbol.
    pub fn success(index: usize, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            symbol: Some(symbol.into()),
            resolved: true,
            error: None,
        }
    }

    /// A row that failed with a typed reason.
    pub fn failure(index: usize, name: impl Into<String>, error: RowError) -> Self {
        Self {
            index,
            name: name.into(),
            symbol: None,
            resolved: false,
            error: Some(error),
        }
    }
}

/// Aggregate statistics for one enrichment run.
///
/// Derived from the outcome set after the last row completes; never
/// partially published.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    pub rows_processed: usize,
    pub rows_updated: usize,
    pub rows_failed: usize,
    pub elapsed_seconds: f64,
    pub success_rate: f64,
}

impl RunStatistics {
    /// Compute statistics from a complete outcome set.
    ///
    /// An empty run is a degenerate success: zero rows, success rate 0.0.
    pub fn from_outcomes(outcomes: &[RowOutcome], elapsed: Duration) -> Self {
        let rows_processed = outcomes.len();
        let rows_updated = outcomes.iter().filter(|o| o.resolved).count();
        let rows_failed = rows_processed - rows_updated;
        let success_rate = if rows_processed == 0 {
            0.0
        } else {
            rows_updated as f64 / rows_processed as f64
        };

        Self {
            rows_processed,
            rows_updated,
            rows_failed,
            elapsed_seconds: elapsed.as_secs_f64(),
            success_rate,
        }
    }
}

/// Completed enrichment run: every outcome, in input order, plus the
/// derived statistics.
#[derive(Debug)]
pub struct EnrichmentRun {
    pub outcomes: Vec<RowOutcome>,
    pub statistics: RunStatistics,
}

/// Result of a single-company lookup.
#[derive(Clone, Debug)]
pub struct SymbolLookup {
    pub name: String,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub resolved: bool,
    pub error: Option<RowError>,
}

/// Report returned by the upload pipeline: where the enriched table was
/// written, and how the run went.
#[derive(Clone, Debug)]
pub struct EnrichmentReport {
    pub output_file: String,
    pub statistics: RunStatistics,
}
