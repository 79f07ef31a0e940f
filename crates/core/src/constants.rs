//! Shared constants for the enrichment pipeline.

/// Rows per processing page. Pages bound peak memory and give the run
/// a checkpoint granularity; they do not affect correctness.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Upper bound on the default worker count.
pub const DEFAULT_WORKER_CAP: usize = 10;

/// Default cap on uploaded file size.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;
