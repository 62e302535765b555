//! newsloom: a seed-driven news crawler engine.
//!
//! The engine claims pending frontier URLs in per-seed batches, fetches
//! and cleans each page, optionally hands the batch to an LLM for
//! article extraction and next-URL selection, and falls back to
//! heuristic extraction when no LLM is configured or enabled.

pub mod config;
pub mod crawler;
pub mod export;
pub mod html;
pub mod llm;
pub mod store;
pub mod supervisor;

use thiserror::Error;

/// Top-level error type for engine operations.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("page at {url} produced no usable context after cleaning")]
    EmptyContext { url: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Bootstrap configuration errors (the small TOML file, not the
/// database-backed `CrawlerConfig` row).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub use config::Settings;
