use super::{Pool, StoreResult};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CrawlSeed {
    pub id: i64,
    pub url: String,
    pub config_id: Option<i64>,
    pub is_active: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub last_error: String,
}

/// Seeds that belong to no config, or to the config this run is using.
/// Ordered by URL so batch composition is deterministic run to run.
pub async fn active_seeds(pool: &Pool, config_id: i64) -> StoreResult<Vec<CrawlSeed>> {
    let seeds = sqlx::query_as::<_, CrawlSeed>(
        "SELECT id, url, config_id, is_active, last_fetched_at, last_error
           FROM crawl_seeds
          WHERE is_active = TRUE AND (config_id IS NULL OR config_id = $1)
          ORDER BY url",
    )
    .bind(config_id)
    .fetch_all(pool)
    .await?;
    Ok(seeds)
}

/// Records a successful fetch against the seed's last-known state.
pub async fn mark_fetched(pool: &Pool, seed_id: i64) -> StoreResult<()> {
    sqlx::query(
        "UPDATE crawl_seeds SET last_fetched_at = now(), last_error = '' WHERE id = $1",
    )
    .bind(seed_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Records a fetch failure and deactivates the seed — a seed that can't
/// be fetched stops producing new queue items until reactivated by hand.
pub async fn mark_failed(pool: &Pool, seed_id: i64, error: &str) -> StoreResult<()> {
    sqlx::query(
        "UPDATE crawl_seeds
            SET last_fetched_at = now(), last_error = $2, is_active = FALSE
          WHERE id = $1",
    )
    .bind(seed_id)
    .bind(error)
    .execute(pool)
    .await?;
    Ok(())
}
