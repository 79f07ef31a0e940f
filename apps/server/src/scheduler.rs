//! Background scheduler for stored-file cleanup.
//!
//! Uploaded and enriched CSVs are transient; anything older than a day
//! is deleted so the data directory never grows without bound.

use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::main_lib::AppState;

/// Cleanup interval: 1 hour
const CLEANUP_INTERVAL_SECS: u64 = 60 * 60;

/// Files older than this are deleted
const MAX_FILE_AGE_SECS: u64 = 24 * 60 * 60;

/// Initial delay before first cleanup (60 seconds to let server fully start)
const INITIAL_DELAY_SECS: u64 = 60;

/// Starts the background file cleanup scheduler.
pub fn start_file_cleanup_scheduler(state: Arc<AppState>) {
    tokio::spawn(async move {
        info!("File cleanup scheduler started (1-hour interval)");

        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut cleanup_interval = interval(Duration::from_secs(CLEANUP_INTERVAL_SECS));

        loop {
            cleanup_interval.tick().await;

            match state
                .file_store
                .cleanup_older_than(Duration::from_secs(MAX_FILE_AGE_SECS))
            {
                Ok(0) => {}
                Ok(cleaned) => info!("Scheduled cleanup removed {} stale files", cleaned),
                Err(e) => warn!("Scheduled cleanup failed: {}", e),
            }
        }
    });
}
