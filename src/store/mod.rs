//! Persistence gateway: one submodule per entity, raw SQL per operation.
//!
//! The frontier claim ([`queue::claim_next_pending_for_seed`] and
//! [`queue::claim_next_pending_any`]) is the one place correctness
//! depends on the backend: both run `SELECT ... FOR UPDATE SKIP
//! LOCKED` inside a transaction so concurrent callers never claim the
//! same row twice and never block behind each other.

pub mod articles;
pub mod config;
pub mod queue;
pub mod runs;
pub mod schema;
pub mod seeds;

use thiserror::Error;

pub type Pool = sqlx::PgPool;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Connects to Postgres and applies the schema.
pub async fn connect(database_url: &str) -> StoreResult<Pool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    schema::initialize_schema(&pool).await?;
    Ok(pool)
}
