//! Enrichment engine: concurrent fan-out over the input rows.
//!
//! The engine drives the row resolver over every input row with a
//! bounded worker pool, collects outcomes into a position-indexed slot
//! store, and derives run statistics once the last row has completed.
//! Completion order is unconstrained; output order is input order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_WORKER_CAP};
use crate::enrichment::enrichment_traits::RowResolverTrait;
use crate::enrichment::{EnrichmentRun, InputRow, RowOutcome, RunStatistics};
use crate::errors::{Error, Result};

/// Options for one enrichment run.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Maximum resolutions in flight at once.
    pub concurrency: usize,
    /// Rows per page. Scheduling granularity only.
    pub page_size: usize,
    /// Optional fixed delay per worker after each resolution, layered
    /// on top of the rate limiter as a conservative measure.
    pub inter_call_delay: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            page_size: DEFAULT_PAGE_SIZE,
            inter_call_delay: None,
        }
    }
}

/// Default worker count: one per core, capped.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(DEFAULT_WORKER_CAP)
}

/// Cooperative cancellation flag for an enrichment run.
///
/// Cheap to clone and share; once set it never resets. A cancelled run
/// returns [`Error::Cancelled`] and never a partial outcome set.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. In-flight resolutions are abandoned at the
    /// next checkpoint.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Drives concurrent row resolution and assembles deterministic output.
pub struct EnrichmentEngine {
    resolver: Arc<dyn RowResolverTrait>,
}

impl EnrichmentEngine {
    pub fn new(resolver: Arc<dyn RowResolverTrait>) -> Self {
        Self { resolver }
    }

    /// Resolve every input row and return the complete outcome set in
    /// input order, plus run statistics.
    ///
    /// A row failure never aborts the run; it is recorded in that row's
    /// outcome and processing continues. The only run-level exits are
    /// cancellation and internal faults.
    pub async fn run(
        &self,
        rows: Vec<InputRow>,
        options: &RunOptions,
        cancel: &CancelToken,
    ) -> Result<EnrichmentRun> {
        let started = Instant::now();

        if options.concurrency == 0 {
            return Err(Error::Validation(
                "concurrency must be positive".to_string(),
            ));
        }

        let total = rows.len();
        if total == 0 {
            // Degenerate success: zero rows, success rate 0.0
            return Ok(EnrichmentRun {
                outcomes: Vec::new(),
                statistics: RunStatistics::from_outcomes(&[], started.elapsed()),
            });
        }

        let page_size = options.page_size.max(1);
        let total_pages = total.div_ceil(page_size);
        info!(
            rows = total,
            pages = total_pages,
            concurrency = options.concurrency,
            "Starting enrichment run"
        );

        // One slot per row index, written exactly once, read back in
        // input order regardless of completion order.
        let mut slots: Vec<Option<RowOutcome>> = (0..total).map(|_| None).collect();
        let semaphore = Arc::new(Semaphore::new(options.concurrency));

        for (page_number, page) in rows.chunks(page_size).enumerate() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let mut tasks = JoinSet::new();

            for row in page {
                if cancel.is_cancelled() {
                    tasks.abort_all();
                    return Err(Error::Cancelled);
                }

                let permit = semaphore
                    .clone()
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::Unexpected(format!("worker pool closed: {e}")))?;
                let resolver = self.resolver.clone();
                let row = row.clone();
                let delay = options.inter_call_delay;

                tasks.spawn(async move {
                    let outcome = resolver.resolve(row).await;
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    drop(permit);
                    outcome
                });
            }

            while let Some(joined) = tasks.join_next().await {
                if cancel.is_cancelled() {
                    tasks.abort_all();
                    return Err(Error::Cancelled);
                }

                let outcome = joined
                    .map_err(|e| Error::Unexpected(format!("resolver task failed: {e}")))?;

                let slot = slots.get_mut(outcome.index).ok_or_else(|| {
                    Error::Unexpected(format!("row index {} out of range", outcome.index))
                })?;
                if slot.is_some() {
                    return Err(Error::Unexpected(format!(
                        "duplicate outcome for row index {}",
                        outcome.index
                    )));
                }
                *slot = Some(outcome);
            }

            debug!("Page {}/{} complete", page_number + 1, total_pages);
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let outcomes = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| Error::Unexpected(format!("missing outcome for row {index}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let statistics = RunStatistics::from_outcomes(&outcomes, started.elapsed());
        info!(
            rows = statistics.rows_processed,
            updated = statistics.rows_updated,
            failed = statistics.rows_failed,
            "Enrichment run complete"
        );

        Ok(EnrichmentRun {
            outcomes,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::RowError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tickerlift_market_data::Candidate;

    /// Resolver stub scripted by company name, with in-flight tracking.
    struct ScriptedResolver {
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Duration,
        cancel_on_first_call: Option<CancelToken>,
    }

    impl ScriptedResolver {
        fn new() -> Arc<Self> {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                delay,
                cancel_on_first_call: None,
            })
        }

        fn cancelling(cancel: CancelToken) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                delay: Duration::ZERO,
                cancel_on_first_call: Some(cancel),
            })
        }
    }

    #[async_trait]
    impl RowResolverTrait for ScriptedResolver {
        async fn select(&self, name: &str) -> std::result::Result<Candidate, RowError> {
            if let Some(cancel) = &self.cancel_on_first_call {
                cancel.cancel();
            }

            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let name = name.trim();
            if name.is_empty() {
                Err(RowError::EmptyName)
            } else if name.starts_with("Unknown") {
                Err(RowError::NotFound(name.to_string()))
            } else if name.starts_with("Broken") {
                Err(RowError::Provider {
                    status: Some("500".to_string()),
                    message: "stub failure".to_string(),
                })
            } else {
                // Symbol derived from the first token, uppercased
                let token = name.split_whitespace().next().unwrap_or(name);
                Ok(Candidate::new(token.to_uppercase()))
            }
        }
    }

    fn rows_from(names: &[&str]) -> Vec<InputRow> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| InputRow::new(index, *name))
            .collect()
    }

    fn options(concurrency: usize, page_size: usize) -> RunOptions {
        RunOptions {
            concurrency,
            page_size,
            inter_call_delay: None,
        }
    }

    #[tokio::test]
    async fn test_output_preserves_input_order() {
        let resolver = ScriptedResolver::with_delay(Duration::from_millis(5));
        let engine = EnrichmentEngine::new(resolver);

        let names: Vec<String> = (0..25).map(|i| format!("Company{i} Holdings")).collect();
        let rows: Vec<InputRow> = names
            .iter()
            .enumerate()
            .map(|(index, name)| InputRow::new(index, name.clone()))
            .collect();

        let run = engine
            .run(rows, &options(8, 10), &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(run.outcomes.len(), 25);
        for (index, outcome) in run.outcomes.iter().enumerate() {
            assert_eq!(outcome.index, index);
            assert_eq!(outcome.symbol.as_deref(), Some(&*format!("COMPANY{index}")));
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let resolver = ScriptedResolver::with_delay(Duration::from_millis(10));
        let engine = EnrichmentEngine::new(resolver.clone());

        let rows = rows_from(&["A co"; 20]);
        engine
            .run(rows, &options(4, 100), &CancelToken::new())
            .await
            .unwrap();

        assert!(resolver.max_in_flight.load(Ordering::SeqCst) <= 4);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 20);
    }

    #[tokio::test]
    async fn test_row_failures_do_not_abort_the_run() {
        let resolver = ScriptedResolver::new();
        let engine = EnrichmentEngine::new(resolver);

        let rows = rows_from(&["Apple Inc", "   ", "Unknownzzz Corp", "Broken Ltd"]);
        let run = engine
            .run(rows, &options(2, 100), &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(run.statistics.rows_processed, 4);
        assert_eq!(run.statistics.rows_updated, 1);
        assert_eq!(run.statistics.rows_failed, 3);
        assert_eq!(run.outcomes[1].error, Some(RowError::EmptyName));
        assert!(matches!(
            run.outcomes[2].error,
            Some(RowError::NotFound(_))
        ));
        assert!(matches!(
            run.outcomes[3].error,
            Some(RowError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let resolver = ScriptedResolver::new();
        let engine = EnrichmentEngine::new(resolver);

        let rows = rows_from(&["Apple Inc", "   ", "Unknownzzz Corp"]);
        let run = engine
            .run(rows, &RunOptions::default(), &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(run.outcomes[0].symbol.as_deref(), Some("APPLE"));
        assert_eq!(run.outcomes[1].symbol, None);
        assert_eq!(run.outcomes[2].symbol, None);

        let stats = &run.statistics;
        assert_eq!(stats.rows_processed, 3);
        assert_eq!(stats.rows_updated, 1);
        assert_eq!(stats.rows_failed, 2);
        assert!((stats.success_rate - 1.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_empty_input_is_degenerate_success() {
        let engine = EnrichmentEngine::new(ScriptedResolver::new());

        let run = engine
            .run(Vec::new(), &RunOptions::default(), &CancelToken::new())
            .await
            .unwrap();

        assert!(run.outcomes.is_empty());
        assert_eq!(run.statistics.rows_processed, 0);
        assert_eq!(run.statistics.success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_rejected() {
        let engine = EnrichmentEngine::new(ScriptedResolver::new());

        let err = engine
            .run(
                rows_from(&["Apple Inc"]),
                &options(0, 100),
                &CancelToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_cancellation_returns_no_partial_output() {
        let cancel = CancelToken::new();
        let resolver = ScriptedResolver::cancelling(cancel.clone());
        let engine = EnrichmentEngine::new(resolver);

        let rows = rows_from(&["Apple Inc"; 10]);
        let err = engine
            .run(rows, &options(1, 100), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_never_dispatches() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let resolver = ScriptedResolver::new();
        let engine = EnrichmentEngine::new(resolver.clone());

        let err = engine
            .run(rows_from(&["Apple Inc"]), &options(1, 100), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_paging_does_not_change_results() {
        let resolver = ScriptedResolver::new();
        let engine = EnrichmentEngine::new(resolver);

        let names: Vec<String> = (0..7).map(|i| format!("Firm{i}")).collect();
        let rows: Vec<InputRow> = names
            .iter()
            .enumerate()
            .map(|(index, name)| InputRow::new(index, name.clone()))
            .collect();

        // page_size smaller than the row count forces multiple pages
        let run = engine
            .run(rows, &options(3, 2), &CancelToken::new())
            .await
            .unwrap();

        assert_eq!(run.outcomes.len(), 7);
        assert_eq!(run.statistics.rows_updated, 7);
        for (index, outcome) in run.outcomes.iter().enumerate() {
            assert_eq!(outcome.index, index);
        }
    }
}
