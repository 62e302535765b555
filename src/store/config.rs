use super::{Pool, StoreResult};
use crate::llm::prompt::DEFAULT_PROMPT;
use sqlx::FromRow;

/// The engine's tunables, stored as a single database row rather than
/// a config file so they can be changed without a restart.
#[derive(Debug, Clone, FromRow)]
pub struct CrawlerConfig {
    pub id: i64,
    pub llm_enabled: bool,
    pub llm_provider: String,
    pub llm_model: String,
    pub llm_base_url: String,
    pub llm_api_key: String,
    pub llm_temperature: f64,
    pub llm_max_output_tokens: i32,
    pub max_context_chars: i32,
    pub max_next_urls: i32,
    pub max_articles: i32,
    pub max_article_chars: i32,
    pub max_pages_per_run: i32,
    pub max_depth: i32,
    pub request_delay_seconds: f64,
    pub user_agent: String,
    pub allow_external_domains: bool,
    pub prompt_template: String,
}

/// Loads the singleton config row, creating it with defaults on first
/// access. Mirrors `get_config()` in the system this engine replaces:
/// there is always exactly one config row, and nothing ever deletes it.
pub async fn get_or_create_config(pool: &Pool) -> StoreResult<CrawlerConfig> {
    if let Some(config) = sqlx::query_as::<_, CrawlerConfig>(
        "SELECT id, llm_enabled, llm_provider, llm_model, llm_base_url, llm_api_key,
                llm_temperature, llm_max_output_tokens, max_context_chars, max_next_urls,
                max_articles, max_article_chars, max_pages_per_run, max_depth,
                request_delay_seconds, user_agent, allow_external_domains, prompt_template
           FROM crawler_config ORDER BY id LIMIT 1",
    )
    .fetch_optional(pool)
    .await?
    {
        return Ok(config);
    }

    let config = sqlx::query_as::<_, CrawlerConfig>(
        "INSERT INTO crawler_config (prompt_template) VALUES ($1)
           RETURNING id, llm_enabled, llm_provider, llm_model, llm_base_url, llm_api_key,
                     llm_temperature, llm_max_output_tokens, max_context_chars, max_next_urls,
                     max_articles, max_article_chars, max_pages_per_run, max_depth,
                     request_delay_seconds, user_agent, allow_external_domains, prompt_template",
    )
    .bind(DEFAULT_PROMPT)
    .fetch_one(pool)
    .await?;
    Ok(config)
}
