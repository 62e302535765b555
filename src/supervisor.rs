//! Enforces a single crawl run per process and exposes its live status.
//!
//! The original implementation this mirrors keeps a module-level
//! `threading.Lock` plus a few module globals. A bare Rust port of
//! that would mean actual global mutable statics; instead this is one
//! value type wrapping a `Mutex`-guarded slot for the background
//! task handle, shared via `Arc` by whoever owns the engine (typically
//! once, for the process's lifetime).

use crate::crawler::CrawlEngine;
use crate::store::queue::{self, QueueCounts};
use crate::store::runs::{self, CrawlRun};
use crate::store::Pool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::error;

struct RunState {
    handle: Option<JoinHandle<()>>,
    last_error: String,
}

pub struct Supervisor {
    pool: Pool,
    fetch_timeout_seconds: u64,
    llm_timeout_seconds: u64,
    state: Arc<Mutex<RunState>>,
}

impl Supervisor {
    pub fn new(pool: Pool, fetch_timeout_seconds: u64, llm_timeout_seconds: u64) -> Self {
        Self {
            pool,
            fetch_timeout_seconds,
            llm_timeout_seconds,
            state: Arc::new(Mutex::new(RunState { handle: None, last_error: String::new() })),
        }
    }

    /// Starts a crawl in the background unless one is already running.
    /// Returns `false` without starting anything if a run is active —
    /// matching `start_crawler_async`'s "only one at a time" contract.
    pub async fn start_async(&self, run_id: Option<i64>) -> bool {
        let mut guard = self.state.lock().await;
        if let Some(handle) = &guard.handle {
            if !handle.is_finished() {
                return false;
            }
        }
        guard.last_error.clear();

        let pool = self.pool.clone();
        let fetch_timeout = self.fetch_timeout_seconds;
        let llm_timeout = self.llm_timeout_seconds;
        let state = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            let result: crate::Result<()> = async {
                let engine = CrawlEngine::new(pool.clone(), fetch_timeout, llm_timeout).await?;
                let run = match run_id {
                    Some(id) => Some(runs::get_run(&pool, id).await?),
                    None => None,
                };
                engine.run(run).await?;
                Ok(())
            }
            .await;

            if let Err(err) = result {
                error!(error = %err, "crawl run failed");
                let mut guard = state.lock().await;
                guard.last_error = err.to_string().chars().take(2000).collect();
            }
        });

        guard.handle = Some(handle);
        true
    }

    pub async fn running(&self) -> bool {
        let guard = self.state.lock().await;
        matches!(&guard.handle, Some(handle) if !handle.is_finished())
    }

    pub async fn last_error(&self) -> String {
        self.state.lock().await.last_error.clone()
    }
}

#[derive(Debug, Clone)]
pub struct LiveStatus {
    pub running: bool,
    pub last_error: String,
    pub last_run: Option<CrawlRun>,
    pub queue: QueueCounts,
}

/// Snapshot used by an external status endpoint: whether a run is
/// active right now, the most recent run's own summary, and current
/// queue counts by status.
pub async fn live_status(pool: &Pool, supervisor: &Supervisor) -> crate::Result<LiveStatus> {
    let last_run = runs::latest_run(pool).await?;
    let queue = queue::counts(pool).await?;
    Ok(LiveStatus {
        running: supervisor.running().await,
        last_error: supervisor.last_error().await,
        last_run,
        queue,
    })
}
