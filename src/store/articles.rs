use super::{Pool, StoreResult};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Article {
    pub id: i64,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub language: String,
}

/// A candidate article pulled out of a page, before the quality gate
/// decides whether it's worth keeping.
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub url: String,
    pub title: String,
    pub body: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
}

const JUNK_MARKERS: &[&str] = &[
    "301 moved permanently",
    "302 found",
    "403 forbidden",
    "404 not found",
    "500 internal server error",
    "nginx",
    "cloudflare",
    "access denied",
    "captcha",
    "enable javascript",
    "service unavailable",
];

/// Rejects error pages, interstitials, and scraps too thin to be an
/// article. Title/body must clear a length floor together (a long body
/// can compensate for a short or missing title and vice versa), the
/// text must not contain a known junk marker, and at least half its
/// characters must be alphabetic — catches binary/garbled bodies that
/// otherwise pass the length check.
pub fn is_article_quality(title: &str, body: &str) -> bool {
    let body = body.trim();
    let title = title.trim();
    if body.is_empty() {
        return false;
    }
    if body.chars().count() < 200 && title.chars().count() < 15 {
        return false;
    }
    let lowered = format!("{title}\n{body}").to_lowercase();
    if JUNK_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return false;
    }
    let alpha = body.chars().filter(|c| c.is_alphabetic()).count();
    let ratio = alpha as f64 / body.chars().count().max(1) as f64;
    ratio >= 0.5
}

/// Applies the quality gate and, if it passes, upserts by URL. Returns
/// `true` only when a new row was inserted, so callers can count
/// `articles_created` the way a run summary expects — an update to an
/// already-seen article doesn't inflate that count.
pub async fn store_if_quality(
    pool: &Pool,
    draft: &ArticleDraft,
    max_article_chars: usize,
) -> StoreResult<bool> {
    if !is_article_quality(&draft.title, &draft.body) {
        return Ok(false);
    }
    let body: String = draft.body.chars().take(max_article_chars).collect();
    let published_at = draft.published_at.unwrap_or_else(Utc::now);

    let inserted: Option<i64> = sqlx::query_scalar(
        "INSERT INTO articles (url, source, published_at, fetched_at, title, body, language)
           VALUES ($1, $2, $3, now(), $4, $5, '')
         ON CONFLICT (url) DO UPDATE
           SET source = EXCLUDED.source,
               published_at = EXCLUDED.published_at,
               fetched_at = EXCLUDED.fetched_at,
               title = EXCLUDED.title,
               body = EXCLUDED.body
         RETURNING (xmax = 0)::int::bigint",
    )
    .bind(&draft.url)
    .bind(&draft.source)
    .bind(published_at)
    .bind(&draft.title)
    .bind(&body)
    .fetch_optional(pool)
    .await?;

    Ok(inserted == Some(1))
}

/// All articles, newest published first — the ordering the CSV export
/// and the original article listing both use.
pub async fn all_ordered_by_published(pool: &Pool) -> StoreResult<Vec<Article>> {
    let rows = sqlx::query_as::<_, Article>(
        "SELECT id, url, source, published_at, fetched_at, title, body, language
           FROM articles
          ORDER BY published_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_body() {
        assert!(!is_article_quality("Title", ""));
    }

    #[test]
    fn rejects_short_title_and_body() {
        assert!(!is_article_quality("Hi", "short"));
    }

    #[test]
    fn accepts_long_body_with_short_title() {
        let body = "word ".repeat(60);
        assert!(is_article_quality("X", &body));
    }

    #[test]
    fn rejects_junk_marker() {
        let body = "word ".repeat(60);
        assert!(!is_article_quality("", &format!("404 not found\n{body}")));
    }

    #[test]
    fn rejects_low_alpha_ratio() {
        let body = "1234567890 ".repeat(30);
        assert!(!is_article_quality("Headline here", &body));
    }
}
