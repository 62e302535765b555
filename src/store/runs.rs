use super::{Pool, StoreResult};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Done,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CrawlRun {
    pub id: i64,
    status: String,
    pub objective: String,
    pub use_llm_filtering: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub pages_processed: i32,
    pub articles_created: i32,
    pub queued_urls: i32,
    pub last_error: String,
}

impl CrawlRun {
    pub fn status(&self) -> RunStatus {
        RunStatus::from_db_string(&self.status).unwrap_or(RunStatus::Running)
    }
}

const RUN_COLUMNS: &str = "id, status, objective, use_llm_filtering, started_at, ended_at,
                pages_processed, articles_created, queued_urls, last_error";

pub async fn create_run(pool: &Pool, objective: &str, use_llm_filtering: bool) -> StoreResult<CrawlRun> {
    let run = sqlx::query_as::<_, CrawlRun>(&format!(
        "INSERT INTO crawl_runs (objective, use_llm_filtering) VALUES ($1, $2) RETURNING {RUN_COLUMNS}"
    ))
    .bind(objective)
    .bind(use_llm_filtering)
    .fetch_one(pool)
    .await?;
    Ok(run)
}

/// Resets a previously failed/done run back to `running` so it can be
/// resumed in place, matching the engine's `run(existing_run)` entry
/// point.
pub async fn restart_run(pool: &Pool, run_id: i64) -> StoreResult<CrawlRun> {
    let run = sqlx::query_as::<_, CrawlRun>(&format!(
        "UPDATE crawl_runs SET status = 'running', last_error = '' WHERE id = $1 RETURNING {RUN_COLUMNS}"
    ))
    .bind(run_id)
    .fetch_one(pool)
    .await?;
    Ok(run)
}

pub async fn get_run(pool: &Pool, run_id: i64) -> StoreResult<CrawlRun> {
    let run = sqlx::query_as::<_, CrawlRun>(&format!(
        "SELECT {RUN_COLUMNS} FROM crawl_runs WHERE id = $1"
    ))
    .bind(run_id)
    .fetch_one(pool)
    .await?;
    Ok(run)
}

pub async fn latest_run(pool: &Pool) -> StoreResult<Option<CrawlRun>> {
    let run = sqlx::query_as::<_, CrawlRun>(&format!(
        "SELECT {RUN_COLUMNS} FROM crawl_runs ORDER BY started_at DESC LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    Ok(run)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOutcome {
    pub status: RunStatusOutcome,
    pub pages_processed: i32,
    pub articles_created: i32,
    pub queued_urls: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunStatusOutcome {
    #[default]
    Done,
    Failed,
}

pub async fn finalize_run(
    pool: &Pool,
    run_id: i64,
    outcome: RunOutcome,
    last_error: &str,
) -> StoreResult<()> {
    let status = match outcome.status {
        RunStatusOutcome::Done => RunStatus::Done,
        RunStatusOutcome::Failed => RunStatus::Failed,
    };
    sqlx::query(
        "UPDATE crawl_runs
            SET status = $2, last_error = $3, pages_processed = $4,
                articles_created = $5, queued_urls = $6, ended_at = now()
          WHERE id = $1",
    )
    .bind(run_id)
    .bind(status.to_db_string())
    .bind(last_error)
    .bind(outcome.pages_processed)
    .bind(outcome.articles_created)
    .bind(outcome.queued_urls)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_roundtrip() {
        for status in [RunStatus::Running, RunStatus::Done, RunStatus::Failed] {
            assert_eq!(RunStatus::from_db_string(status.to_db_string()), Some(status));
        }
    }
}
