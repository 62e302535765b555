//! Page text cleaning and heuristic extraction, used both to build the
//! LLM context and as the fallback article/URL source when no LLM is
//! configured.

pub mod clean;
pub mod extract;

pub use clean::{clean_html, clip_text};
pub use extract::{extract_body_text, extract_candidate_urls, extract_published_at, extract_title};
