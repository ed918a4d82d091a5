//! Refresh pipeline: source grouping, bounded concurrent fetching, snapshot
//! publication and the periodic scheduler that drives it.

pub mod orchestrator;
pub mod scheduler;

pub use orchestrator::{FeedGroup, RefreshOrchestrator, RefreshReport, group_sources_by_url};
pub use scheduler::SchedulerService;

#[cfg(test)]
pub(crate) mod test_support;
