use serde::Serialize;

use crate::domain::Variety;

/// Progress snapshot emitted once per completed search task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchProgress {
    pub completed: usize,
    pub total: usize,
    /// Variety whose task just completed
    pub variety: Variety,
}

impl SearchProgress {
    /// Completed share of the run in `[0, 1]`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_finished(&self) -> bool {
        self.completed >= self.total
    }
}
