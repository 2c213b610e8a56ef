//! Application layer - search orchestration
//!
//! Schedules one search task per variety, bounds their concurrency and merges
//! the rows they produce into a result table.

pub mod aggregator;
pub mod orchestrator;
pub mod progress;
pub mod search_task;

pub use aggregator::ResultAggregator;
pub use orchestrator::{OrchestratorConfig, SearchOrchestrator};
pub use progress::SearchProgress;
pub use search_task::{SearchTask, TaskContext, TaskOutcome, TaskState};
