//! Result aggregation
//!
//! Concatenates per-task row batches in the order they arrive. No sorting,
//! grouping or de-duplication happens here.

use tracing::debug;

use super::progress::SearchProgress;
use super::search_task::TaskOutcome;
use crate::domain::ResultTable;

#[derive(Debug)]
pub struct ResultAggregator {
    total: usize,
    reported: Vec<bool>,
    completed: usize,
    table: ResultTable,
}

impl ResultAggregator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            reported: vec![false; total],
            completed: 0,
            table: ResultTable::new(),
        }
    }

    /// Merge one task's rows and return the resulting progress.
    ///
    /// A second outcome for an already reported task is ignored so the
    /// completed count never exceeds the number of tasks.
    pub fn absorb(&mut self, outcome: TaskOutcome) -> Option<SearchProgress> {
        match self.reported.get_mut(outcome.index) {
            Some(seen) if !*seen => *seen = true,
            _ => {
                debug!("Ignoring duplicate or unknown outcome for task #{}", outcome.index);
                return None;
            }
        }

        self.completed += 1;
        self.table.extend(outcome.rows);
        Some(SearchProgress {
            completed: self.completed,
            total: self.total,
            variety: outcome.variety,
        })
    }

    pub fn has_reported(&self, index: usize) -> bool {
        self.reported.get(index).copied().unwrap_or(false)
    }

    pub fn finish(self) -> ResultTable {
        self.table
    }
}
