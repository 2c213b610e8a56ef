//! # Search Task
//!
//! One task covers one variety across every selected site. Sites are queried
//! strictly one after another; per-site failures become error rows and never
//! abort the remaining sites.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::domain::{FetchError, PacingPolicy, ResultRow, Site, SiteAdapter, Variety};

/// Lifecycle of a search task. There is no retrying state: a failed cell is
/// recorded and the task moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
}

/// Collaborators shared by every task of a run
pub struct TaskContext {
    pub adapter: Arc<dyn SiteAdapter>,
    pub pacing: Arc<dyn PacingPolicy>,
    pub title_limit: usize,
    pub request_timeout: Option<Duration>,
}

/// Rows produced by one finished task
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub index: usize,
    pub variety: Variety,
    pub rows: Vec<ResultRow>,
}

impl TaskOutcome {
    /// Outcome for a task that never reported back: one error row per site.
    pub fn aborted(index: usize, variety: Variety, sites: &[Site], reason: &str) -> Self {
        let error = FetchError::TaskAborted {
            reason: reason.to_string(),
        };
        let rows = sites
            .iter()
            .map(|site| ResultRow::error(variety.clone(), *site, &error))
            .collect();
        Self { index, variety, rows }
    }
}

#[derive(Debug)]
pub struct SearchTask {
    index: usize,
    variety: Variety,
    sites: Arc<[Site]>,
    state: TaskState,
}

impl SearchTask {
    pub fn new(index: usize, variety: Variety, sites: Arc<[Site]>) -> Self {
        Self {
            index,
            variety,
            sites,
            state: TaskState::Pending,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn variety(&self) -> &Variety {
        &self.variety
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Query every site in order and collect this variety's rows.
    ///
    /// Per site the task contributes one row per returned title, or exactly
    /// one error row. The pacing policy brackets every adapter call.
    pub async fn run(&mut self, context: &TaskContext) -> Vec<ResultRow> {
        self.state = TaskState::Running;
        debug!("Task #{} '{}' running over {} sites", self.index, self.variety, self.sites.len());

        let mut rows = Vec::new();
        for &site in self.sites.as_ref() {
            context.pacing.before_request(site).await;
            let result = self.query_site(context, site).await;
            context.pacing.after_request(site).await;

            match result {
                Ok(titles) => {
                    debug!("'{}' on {}: {} titles", self.variety, site, titles.len());
                    rows.extend(
                        titles
                            .into_iter()
                            .map(|title| ResultRow::title(self.variety.clone(), site, title)),
                    );
                }
                Err(e) => {
                    if e.is_transient() {
                        warn!("'{}' on {} failed: {}", self.variety, site, e);
                    } else {
                        error!("'{}' on {} failed permanently: {}", self.variety, site, e);
                    }
                    rows.push(ResultRow::error(self.variety.clone(), site, &e));
                }
            }
        }

        self.state = TaskState::Completed;
        rows
    }

    async fn query_site(&self, context: &TaskContext, site: Site) -> Result<Vec<String>, FetchError> {
        let fetch = context.adapter.fetch_titles(site, self.variety.as_str());
        let titles = match context.request_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| FetchError::timeout(limit))??,
            None => fetch.await?,
        };
        Ok(keep_titles(titles, context.title_limit))
    }
}

/// Trim, drop empty titles and cap the count, keeping page order.
fn keep_titles(titles: Vec<String>, limit: usize) -> Vec<String> {
    titles
        .into_iter()
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .take(limit)
        .collect()
}
