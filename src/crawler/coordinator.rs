//! Harvest orchestration
//!
//! Ties the pipeline together for one manufacturer: load persisted job
//! state, run link discovery once if the universe is empty, compute the
//! remaining work queue, drain it through the worker pool, and persist
//! what actually completed.

use crate::config::{Config, SessionConfig};
use crate::crawler::discoverer::discover;
use crate::crawler::fetcher::{HttpSessionFactory, SessionFactory};
use crate::crawler::worker::WorkerPool;
use crate::output::{CompletionLog, CsvSink};
use crate::storage::{SqliteStateStore, StateStore};
use crate::{Result, SweepError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;

/// Job parameters for one harvest invocation
#[derive(Debug, Clone)]
pub struct HarvestJob {
    /// Manufacturer name; also the storage namespace
    pub manufacturer: String,

    /// Listing page to start discovery from
    pub start_url: String,

    /// Bound on the number of listing pages visited during discovery
    pub max_pages: Option<u32>,

    /// Discard persisted state and re-discover from scratch
    pub fresh: bool,

    /// Hash of the configuration file, recorded in job-state metadata
    pub config_hash: Option<String>,
}

/// Counters reported after a run
#[derive(Debug)]
pub struct HarvestSummary {
    pub manufacturer: String,
    pub universe: usize,
    pub completed_this_run: usize,
    pub failed_this_run: usize,
    pub remaining: usize,
    pub elapsed: Duration,
}

/// Runs the full harvest pipeline for one manufacturer
///
/// Every run is resumable: the remaining queue is recomputed as
/// universe − completed from persisted state, and only links whose worker
/// task reported success are marked completed afterwards, so a link that
/// failed every fetch attempt is retried on the next invocation.
pub async fn run_harvest(config: &Config, job: &HarvestJob) -> Result<HarvestSummary> {
    let started = Instant::now();

    let dir = Path::new(&config.output.data_dir).join(&job.manufacturer);
    std::fs::create_dir_all(&dir)?;

    let mut store = SqliteStateStore::open(&dir.join("state.db"))?;
    if job.fresh {
        tracing::info!("Starting fresh: discarding persisted state");
        store.clear()?;
    }
    if let Some(hash) = &job.config_hash {
        store.set_meta("config-hash", hash)?;
    }

    let referer = effective_referer(&config.session, &job.start_url)?;
    let sessions: Arc<dyn SessionFactory> =
        Arc::new(HttpSessionFactory::new(config.session.clone(), referer));

    let mut state = store.load_state()?;
    if state.is_discovered() {
        tracing::info!(
            "Resuming: universe of {} links already discovered",
            state.universe().len()
        );
    } else {
        let session = sessions.create().map_err(|source| SweepError::Fetch {
            url: job.start_url.clone(),
            source,
        })?;
        let links = discover(
            &*session,
            &job.start_url,
            job.max_pages,
            config.crawl.page_delay,
        )
        .await?;
        tracing::info!("Found {} detail-page links to harvest", links.len());
        store.insert_links(&links)?;
        store.set_meta("start-url", &job.start_url)?;
        state = store.load_state()?;
    }

    let remaining = state.remaining();
    tracing::info!(
        "{} of {} links remaining to harvest",
        remaining.len(),
        state.universe().len()
    );

    let sink = CsvSink::open(&dir.join(format!("{}.csv", job.manufacturer)))?;
    let completion_log =
        CompletionLog::open(&dir.join(format!("{}_completed.txt", job.manufacturer)))?;

    let pool = WorkerPool::new(
        config.crawl.clone(),
        &job.manufacturer,
        sessions,
        Arc::new(Mutex::new(sink)),
        Arc::new(Mutex::new(completion_log)),
    );
    let reports = pool.run(remaining).await;

    let completed_urls: Vec<String> = reports
        .iter()
        .filter(|report| report.is_completed())
        .map(|report| report.url.clone())
        .collect();
    store.mark_completed(&completed_urls)?;

    let failed = reports.len() - completed_urls.len();
    let final_state = store.load_state()?;

    let summary = HarvestSummary {
        manufacturer: job.manufacturer.clone(),
        universe: final_state.universe().len(),
        completed_this_run: completed_urls.len(),
        failed_this_run: failed,
        remaining: final_state.remaining().len(),
        elapsed: started.elapsed(),
    };

    tracing::info!(
        "Harvest finished for {}: {} completed, {} failed, {} remaining ({:.1?})",
        summary.manufacturer,
        summary.completed_this_run,
        summary.failed_this_run,
        summary.remaining,
        summary.elapsed
    );

    Ok(summary)
}

/// Resolves the referer header: explicit config wins, otherwise the
/// origin of the start URL
fn effective_referer(session: &SessionConfig, start_url: &str) -> Result<String> {
    if !session.referer.is_empty() {
        return Ok(session.referer.clone());
    }
    let url = Url::parse(start_url)?;
    Ok(format!("{}/", url.origin().ascii_serialization()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_referer_wins() {
        let session = SessionConfig {
            referer: "https://configured.example.com/".to_string(),
            ..SessionConfig::default()
        };
        let referer =
            effective_referer(&session, "https://cat.example.com/acme-1.php").unwrap();
        assert_eq!(referer, "https://configured.example.com/");
    }

    #[test]
    fn test_referer_derived_from_start_url() {
        let session = SessionConfig::default();
        let referer =
            effective_referer(&session, "https://cat.example.com/acme-1.php").unwrap();
        assert_eq!(referer, "https://cat.example.com/");
    }

    #[test]
    fn test_invalid_start_url_is_an_error() {
        let session = SessionConfig::default();
        assert!(effective_referer(&session, "not a url").is_err());
    }
}
