//! # Search Orchestrator
//!
//! Fans a variety list out into one search task per variety, runs the tasks on
//! a bounded pool and merges their rows as they complete.
//!
//! Workers never touch shared accumulation state: each spawned task sends its
//! outcome through a channel, and the single consumer loop in [`SearchOrchestrator::run`]
//! owns the aggregator and drives the progress callback.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, error, info};

use super::aggregator::ResultAggregator;
use super::progress::SearchProgress;
use super::search_task::{SearchTask, TaskContext, TaskOutcome};
use crate::domain::{MAX_TITLES_PER_SITE, PacingPolicy, ResultTable, Site, SiteAdapter, Variety};
use crate::infrastructure::config::{SearchConfig, defaults};

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum number of search tasks running at the same time
    pub max_concurrent_tasks: usize,

    /// Titles kept per (variety, site) pair, at most [`MAX_TITLES_PER_SITE`]
    pub title_limit: usize,

    /// Upper bound for a single adapter call; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: defaults::MAX_CONCURRENT_TASKS,
            title_limit: MAX_TITLES_PER_SITE,
            request_timeout: Some(Duration::from_secs(defaults::REQUEST_TIMEOUT_SECONDS)),
        }
    }
}

impl OrchestratorConfig {
    /// Create OrchestratorConfig from the search section of the app config
    pub fn from_search_config(search: &SearchConfig, request_timeout_seconds: u64) -> Self {
        Self {
            max_concurrent_tasks: search.max_concurrent_tasks,
            title_limit: search.titles_per_site,
            request_timeout: (request_timeout_seconds > 0)
                .then(|| Duration::from_secs(request_timeout_seconds)),
        }
    }
}

pub struct SearchOrchestrator {
    context: Arc<TaskContext>,
    config: OrchestratorConfig,
}

impl SearchOrchestrator {
    pub fn new(
        adapter: Arc<dyn SiteAdapter>,
        pacing: Arc<dyn PacingPolicy>,
        config: OrchestratorConfig,
    ) -> Self {
        let context = Arc::new(TaskContext {
            adapter,
            pacing,
            title_limit: config.title_limit.clamp(1, MAX_TITLES_PER_SITE),
            request_timeout: config.request_timeout,
        });
        Self { context, config }
    }

    /// Search raw terms, skipping empty or whitespace-only entries.
    pub async fn run_terms<I, S, F>(&self, terms: I, sites: &[Site], on_progress: F) -> ResultTable
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&SearchProgress),
    {
        self.run(Variety::collect_valid(terms), sites, on_progress).await
    }

    /// Search every variety on every selected site.
    ///
    /// `on_progress` is called exactly once per completed variety with a
    /// non-decreasing completed count. An empty variety list or an empty site
    /// selection returns an empty table without calling it.
    pub async fn run<F>(&self, varieties: Vec<Variety>, sites: &[Site], mut on_progress: F) -> ResultTable
    where
        F: FnMut(&SearchProgress),
    {
        let sites = Site::normalize_selection(sites);
        if varieties.is_empty() || sites.is_empty() {
            info!(
                "Nothing to search ({} varieties, {} sites)",
                varieties.len(),
                sites.len()
            );
            return ResultTable::new();
        }

        let total = varieties.len();
        let started = Instant::now();
        let max_concurrent = self.config.max_concurrent_tasks.max(1);
        info!(
            "🚀 Searching {} varieties on {} sites ({}) with up to {} concurrent tasks",
            total,
            sites.len(),
            sites.iter().map(|site| site.display_name()).collect::<Vec<_>>().join(", "),
            max_concurrent
        );

        let sites: Arc<[Site]> = sites.into();
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<TaskOutcome>();
        let mut handles = Vec::with_capacity(total);

        for (index, variety) in varieties.into_iter().enumerate() {
            let mut task = SearchTask::new(index, variety.clone(), Arc::clone(&sites));
            let context = Arc::clone(&self.context);
            let semaphore = Arc::clone(&semaphore);
            let outcome_tx = outcome_tx.clone();

            let handle = tokio::spawn(async move {
                // Queued tasks stay Pending until a slot frees up
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    error!("Worker pool closed before task #{} could start", task.index());
                    return;
                };

                let rows = task.run(&context).await;
                let outcome = TaskOutcome {
                    index: task.index(),
                    variety: task.variety().clone(),
                    rows,
                };
                if outcome_tx.send(outcome).is_err() {
                    debug!("Result consumer gone, dropping outcome of task #{}", task.index());
                }
            });
            handles.push((index, variety, handle));
        }
        // Only worker senders remain, so the channel closes when the last task ends
        drop(outcome_tx);

        let mut aggregator = ResultAggregator::new(total);
        while let Some(outcome) = outcome_rx.recv().await {
            if let Some(progress) = aggregator.absorb(outcome) {
                debug!(
                    "Completed '{}' ({}/{})",
                    progress.variety, progress.completed, progress.total
                );
                on_progress(&progress);
            }
        }

        // A task that panicked or never got a slot still owes its rows
        let joined = join_all(
            handles
                .into_iter()
                .map(|(index, variety, handle)| async move { (index, variety, handle.await) }),
        )
        .await;
        for (index, variety, result) in joined {
            if aggregator.has_reported(index) {
                continue;
            }
            let reason = match result {
                Err(join_error) => join_error.to_string(),
                Ok(()) => "task ended without reporting".to_string(),
            };
            error!("Task #{} '{}' aborted: {}", index, variety, reason);
            let outcome = TaskOutcome::aborted(index, variety, &sites, &reason);
            if let Some(progress) = aggregator.absorb(outcome) {
                on_progress(&progress);
            }
        }

        let table = aggregator.finish();
        info!(
            "✅ Search completed: {} rows ({} errors) for {} varieties in {:.1}s",
            table.len(),
            table.error_count(),
            total,
            started.elapsed().as_secs_f64()
        );
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FetchError;
    use crate::infrastructure::pacing::FixedDelayPacing;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingAdapter {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl SiteAdapter for CountingAdapter {
        async fn fetch_titles(&self, _site: Site, query: &str) -> Result<Vec<String>, FetchError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![format!("{query} listing")])
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_is_bounded() {
        let adapter = Arc::new(CountingAdapter {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let orchestrator = SearchOrchestrator::new(
            adapter.clone(),
            Arc::new(FixedDelayPacing::new(Duration::ZERO)),
            OrchestratorConfig {
                max_concurrent_tasks: 3,
                ..OrchestratorConfig::default()
            },
        );

        let terms: Vec<String> = (0..12).map(|i| format!("variety {i}")).collect();
        let table = orchestrator.run_terms(&terms, &[Site::Ebay], |_| {}).await;

        assert_eq!(table.len(), 12);
        assert!(adapter.peak.load(Ordering::SeqCst) <= 3);
    }

    struct PanickingAdapter;

    #[async_trait]
    impl SiteAdapter for PanickingAdapter {
        async fn fetch_titles(&self, _site: Site, query: &str) -> Result<Vec<String>, FetchError> {
            assert!(query != "explode", "adapter blew up");
            Ok(vec![query.to_string()])
        }
    }

    #[tokio::test]
    async fn test_panicking_task_still_reports_rows() {
        let orchestrator = SearchOrchestrator::new(
            Arc::new(PanickingAdapter),
            Arc::new(FixedDelayPacing::new(Duration::ZERO)),
            OrchestratorConfig::default(),
        );

        let mut progress_calls = 0;
        let table = orchestrator
            .run_terms(["fine", "explode"], &[Site::Ebay, Site::VCoins], |_| progress_calls += 1)
            .await;

        assert_eq!(progress_calls, 2);
        let exploded: Vec<_> = table.rows_for("explode").collect();
        assert_eq!(exploded.len(), 2);
        assert!(exploded.iter().all(|row| row.listing.is_error()));
        assert_eq!(table.rows_for("fine").count(), 2);
    }

    #[test]
    fn test_config_from_search_section() {
        let search = SearchConfig::default();
        let config = OrchestratorConfig::from_search_config(&search, 0);
        assert_eq!(config.max_concurrent_tasks, defaults::MAX_CONCURRENT_TASKS);
        assert!(config.request_timeout.is_none());
    }
}
