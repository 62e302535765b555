//! Bootstrap configuration for newsloom.
//!
//! `CrawlerConfig` (the tunables the engine reads every run: depth
//! limits, LLM provider, prompt template) lives in the database as a
//! singleton row — see [`crate::store::config`]. What's loaded from a
//! TOML file here is strictly the bootstrap settings needed before a
//! database connection exists: where the database is, and how long to
//! wait on outbound HTTP.

mod settings;

pub use settings::{load_settings, Settings};
