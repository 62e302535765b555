//! The crawl engine: claim, fetch, extract, assign, enqueue.

mod engine;
pub mod fetch;
pub mod next_url;

pub use engine::CrawlEngine;
