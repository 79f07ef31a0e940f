//! Core error types for the TickerLift application.
//!
//! Run-level failures only: anything that aborts a whole enrichment run
//! or request. Per-row failures are data, carried inside
//! [`RowOutcome`](crate::enrichment::RowOutcome), and never appear here.

use thiserror::Error;

use crate::files::FileError;
use crate::tables::TableError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for enrichment operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The run was cancelled before completion. No partial output is
    /// produced for a cancelled run.
    #[error("Enrichment run cancelled")]
    Cancelled,

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Table operation failed: {0}")]
    Table(#[from] TableError),

    #[error("File operation failed: {0}")]
    File(#[from] FileError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
