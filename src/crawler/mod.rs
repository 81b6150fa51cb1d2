//! Crawl pipeline
//!
//! This module contains the core harvesting logic:
//! - Paginated link discovery
//! - Per-task fetch sessions with retry
//! - The bounded worker pool
//! - Overall harvest orchestration

mod coordinator;
mod discoverer;
mod fetcher;
mod worker;

pub use coordinator::{run_harvest, HarvestJob, HarvestSummary};
pub use discoverer::{discover, DiscoveryError};
pub use fetcher::{FetchError, FetchSession, HttpSessionFactory, SessionFactory};
pub use worker::{TaskOutcome, TaskReport, WorkerPool};

use crate::config::DelayRange;
use std::time::Duration;

/// Sleeps for a uniformly random duration drawn from the range
///
/// Used for the inter-page delay during discovery and the backoff between
/// fetch attempts. Blocks only the calling task.
pub(crate) async fn sleep_jitter(range: DelayRange) {
    let ms = fastrand::u64(range.min_ms..=range.max_ms);
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
