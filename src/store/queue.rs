use super::seeds::CrawlSeed;
use super::{Pool, StoreResult};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    Pending,
    InProgress,
    Done,
    Failed,
}

impl QueueStatus {
    pub fn to_db_string(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CrawlQueueItem {
    pub id: i64,
    pub url: String,
    pub seed_id: Option<i64>,
    pub seed_url: String,
    pub depth: i32,
    status: String,
    pub discovered_at: DateTime<Utc>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub attempts: i32,
    pub last_error: String,
}

impl CrawlQueueItem {
    pub fn status(&self) -> QueueStatus {
        QueueStatus::from_db_string(&self.status).unwrap_or(QueueStatus::Pending)
    }
}

/// Seeds their own queue item (depth 0) the first time the engine runs
/// with an empty pending queue. Mirrors `_ensure_seed_queue`: once any
/// pending item exists, this is a no-op, so re-seeding never duplicates
/// a seed that already produced queue items.
pub async fn ensure_seed_queue(pool: &Pool, seeds: &[CrawlSeed]) -> StoreResult<()> {
    let pending: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM crawl_queue_items WHERE status = 'pending'")
            .fetch_one(pool)
            .await?;
    if pending > 0 {
        return Ok(());
    }
    for seed in seeds {
        sqlx::query(
            "INSERT INTO crawl_queue_items (url, seed_id, seed_url, depth)
               VALUES ($1, $2, $1, 0)
             ON CONFLICT (url) DO NOTHING",
        )
        .bind(&seed.url)
        .bind(seed.id)
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn claim_row(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    row: Option<CrawlQueueItem>,
) -> StoreResult<Option<CrawlQueueItem>> {
    let Some(mut item) = row else {
        return Ok(None);
    };
    sqlx::query(
        "UPDATE crawl_queue_items
            SET status = 'in_progress', attempts = attempts + 1, last_attempt_at = now()
          WHERE id = $1",
    )
    .bind(item.id)
    .execute(&mut **tx)
    .await?;
    item.attempts += 1;
    item.status = QueueStatus::InProgress.to_db_string().to_string();
    Ok(Some(item))
}

/// Claims the oldest pending item belonging to this seed (or, for
/// items discovered before any seed linkage existed, matching its
/// `seed_url`). Runs `FOR UPDATE SKIP LOCKED` so a concurrent claimer
/// working a different seed never blocks behind this one.
pub async fn claim_next_pending_for_seed(
    pool: &Pool,
    seed: &CrawlSeed,
) -> StoreResult<Option<CrawlQueueItem>> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, CrawlQueueItem>(
        "SELECT id, url, seed_id, seed_url, depth, status, discovered_at,
                last_attempt_at, attempts, last_error
           FROM crawl_queue_items
          WHERE status = 'pending' AND (seed_id = $1 OR (seed_id IS NULL AND seed_url = $2))
          ORDER BY discovered_at
          LIMIT 1
          FOR UPDATE SKIP LOCKED",
    )
    .bind(seed.id)
    .bind(&seed.url)
    .fetch_optional(&mut *tx)
    .await?;
    let claimed = claim_row(&mut tx, row).await?;
    tx.commit().await?;
    Ok(claimed)
}

/// Tops a batch up with any pending item not already claimed, used
/// once every seed has been tried and the batch is still short of its
/// target size.
pub async fn claim_next_pending_any(
    pool: &Pool,
    exclude_ids: &[i64],
) -> StoreResult<Option<CrawlQueueItem>> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, CrawlQueueItem>(
        "SELECT id, url, seed_id, seed_url, depth, status, discovered_at,
                last_attempt_at, attempts, last_error
           FROM crawl_queue_items
          WHERE status = 'pending' AND NOT (id = ANY($1))
          ORDER BY discovered_at
          LIMIT 1
          FOR UPDATE SKIP LOCKED",
    )
    .bind(exclude_ids)
    .fetch_optional(&mut *tx)
    .await?;
    let claimed = claim_row(&mut tx, row).await?;
    tx.commit().await?;
    Ok(claimed)
}

pub async fn mark_done(pool: &Pool, item_id: i64) -> StoreResult<()> {
    sqlx::query("UPDATE crawl_queue_items SET status = 'done', last_error = '' WHERE id = $1")
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn mark_failed(pool: &Pool, item_id: i64, error: &str) -> StoreResult<()> {
    sqlx::query("UPDATE crawl_queue_items SET status = 'failed', last_error = $2 WHERE id = $1")
        .bind(item_id)
        .bind(error)
        .execute(pool)
        .await?;
    Ok(())
}

/// Inserts a newly-discovered URL at `depth` if it isn't already
/// queued. Returns `true` if a row was actually created, so callers
/// can count genuinely new URLs the way `queued_urls` on a run expects.
pub async fn enqueue(
    pool: &Pool,
    url: &str,
    seed_id: Option<i64>,
    seed_url: &str,
    depth: i32,
) -> StoreResult<bool> {
    let result = sqlx::query(
        "INSERT INTO crawl_queue_items (url, seed_id, seed_url, depth)
           VALUES ($1, $2, $3, $4)
         ON CONFLICT (url) DO NOTHING",
    )
    .bind(url)
    .bind(seed_id)
    .bind(seed_url)
    .bind(depth)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueueCounts {
    pub pending: i64,
    pub in_progress: i64,
    pub done: i64,
    pub failed: i64,
}

pub async fn counts(pool: &Pool) -> StoreResult<QueueCounts> {
    let mut counts = QueueCounts::default();
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM crawl_queue_items GROUP BY status")
            .fetch_all(pool)
            .await?;
    for (status, count) in rows {
        match QueueStatus::from_db_string(&status) {
            Some(QueueStatus::Pending) => counts.pending = count,
            Some(QueueStatus::InProgress) => counts.in_progress = count,
            Some(QueueStatus::Done) => counts.done = count,
            Some(QueueStatus::Failed) => counts.failed = count,
            None => {}
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_status_roundtrip() {
        for status in [
            QueueStatus::Pending,
            QueueStatus::InProgress,
            QueueStatus::Done,
            QueueStatus::Failed,
        ] {
            assert_eq!(QueueStatus::from_db_string(status.to_db_string()), Some(status));
        }
    }

    #[test]
    fn queue_status_rejects_unknown() {
        assert_eq!(QueueStatus::from_db_string("bogus"), None);
    }
}
