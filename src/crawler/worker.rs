//! Crawl worker pool
//!
//! A fixed-width pool of tasks draining the remaining-work queue. Each
//! task runs the full fetch→normalize→persist sequence for one link to
//! completion before taking the next, with its own isolated fetch session
//! per link. Failures are reported, never propagated: one bad link costs
//! its own records, not the run.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{FetchError, FetchSession, SessionFactory};
use crate::crawler::sleep_jitter;
use crate::extract::normalize;
use crate::output::{CompletionLog, CsvSink, SinkError};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinSet;

/// What happened to one link's task
#[derive(Debug)]
pub enum TaskOutcome {
    /// Records extracted and persisted; the link may be marked completed
    Completed { records: usize, fetch_seconds: f64 },

    /// Every fetch attempt failed; the link stays eligible for a future run
    FetchFailed { attempts: u32, error: FetchError },

    /// Records extracted but the sink append failed; the link must not be
    /// marked completed
    SinkFailed { error: SinkError },
}

/// Per-link report returned by the pool
#[derive(Debug)]
pub struct TaskReport {
    pub url: String,
    pub outcome: TaskOutcome,
}

impl TaskReport {
    /// True when the link's records were persisted
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Completed { .. })
    }
}

/// Bounded-concurrency executor for the remaining-work queue
pub struct WorkerPool {
    config: CrawlConfig,
    manufacturer: String,
    sessions: Arc<dyn SessionFactory>,
    sink: Arc<Mutex<CsvSink>>,
    completion_log: Arc<Mutex<CompletionLog>>,
}

impl WorkerPool {
    /// Creates a pool over shared output sinks
    ///
    /// The sink and completion log are the only shared mutable resources;
    /// their mutexes serialize concurrent appends.
    pub fn new(
        config: CrawlConfig,
        manufacturer: &str,
        sessions: Arc<dyn SessionFactory>,
        sink: Arc<Mutex<CsvSink>>,
        completion_log: Arc<Mutex<CompletionLog>>,
    ) -> Self {
        Self {
            config,
            manufacturer: manufacturer.to_string(),
            sessions,
            sink,
            completion_log,
        }
    }

    /// Drains the queue and returns one report per link
    ///
    /// Spawns `worker-count` tasks that pull links until the queue is
    /// empty. A worker panic is logged and loses only the reports that
    /// worker had accumulated; sibling workers keep running.
    pub async fn run(&self, remaining: Vec<String>) -> Vec<TaskReport> {
        let width = (self.config.worker_count as usize).min(remaining.len().max(1));
        let queue = Arc::new(Mutex::new(VecDeque::from(remaining)));

        let mut workers = JoinSet::new();
        for worker_id in 0..width {
            let queue = Arc::clone(&queue);
            let config = self.config.clone();
            let manufacturer = self.manufacturer.clone();
            let sessions = Arc::clone(&self.sessions);
            let sink = Arc::clone(&self.sink);
            let completion_log = Arc::clone(&self.completion_log);

            workers.spawn(async move {
                let mut reports = Vec::new();
                loop {
                    let url = queue.lock().unwrap().pop_front();
                    let Some(url) = url else {
                        break;
                    };
                    tracing::debug!("Worker {} picked up {}", worker_id, url);
                    reports.push(
                        harvest_one(&config, &manufacturer, &*sessions, &sink, &completion_log, url)
                            .await,
                    );
                }
                reports
            });
        }

        let mut all_reports = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(reports) => all_reports.extend(reports),
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }
        all_reports
    }
}

/// Runs the full sequence for one link
///
/// The session is created here and dropped on every exit path.
async fn harvest_one(
    config: &CrawlConfig,
    manufacturer: &str,
    sessions: &dyn SessionFactory,
    sink: &Mutex<CsvSink>,
    completion_log: &Mutex<CompletionLog>,
    url: String,
) -> TaskReport {
    let session = match sessions.create() {
        Ok(session) => session,
        Err(error) => {
            tracing::error!("Failed to create fetch session for {}: {}", url, error);
            return TaskReport {
                url,
                outcome: TaskOutcome::FetchFailed { attempts: 0, error },
            };
        }
    };

    let started = Instant::now();
    let html = match fetch_with_retry(config, &*session, &url).await {
        Ok(html) => html,
        Err((attempts, error)) => {
            return TaskReport {
                url,
                outcome: TaskOutcome::FetchFailed { attempts, error },
            }
        }
    };
    let fetch_seconds = started.elapsed().as_secs_f64();

    let records = normalize(&html, manufacturer);
    tracing::info!(
        "Harvested {} in {:.2}s ({} record(s))",
        url,
        fetch_seconds,
        records.len()
    );

    if !records.is_empty() {
        let appended = sink.lock().unwrap().append_all(&records);
        if let Err(error) = appended {
            tracing::error!("Failed to append records for {}: {}", url, error);
            return TaskReport {
                url,
                outcome: TaskOutcome::SinkFailed { error },
            };
        }
    }

    // Audit trail only; a log failure does not undo a persisted record.
    if let Err(error) = completion_log.lock().unwrap().append(&url) {
        tracing::warn!("Failed to append {} to completion log: {}", url, error);
    }

    TaskReport {
        url,
        outcome: TaskOutcome::Completed {
            records: records.len(),
            fetch_seconds,
        },
    }
}

/// Fetches with a bounded retry budget and jittered backoff
///
/// Returns the attempt count alongside the final error so the report can
/// say how hard the link was tried.
async fn fetch_with_retry(
    config: &CrawlConfig,
    session: &dyn FetchSession,
    url: &str,
) -> Result<String, (u32, FetchError)> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        tracing::debug!(
            "Fetching {} (attempt {}/{})",
            url,
            attempt,
            config.fetch_retries
        );
        match session.fetch(url).await {
            Ok(html) => return Ok(html),
            Err(error) => {
                tracing::warn!("Failed to fetch {} on attempt {}: {}", url, attempt, error);
                if attempt >= config.fetch_retries {
                    tracing::error!("All {} attempts failed for {}", config.fetch_retries, url);
                    return Err((attempt, error));
                }
                sleep_jitter(config.retry_delay).await;
            }
        }
    }
}
