//! CSV export of stored articles.

use crate::store::articles::all_ordered_by_published;
use crate::store::Pool;
use crate::Result;
use std::io::Write;

/// Writes every article, newest published first, as CSV with a header
/// row. Returns the number of data rows written.
pub async fn write_csv<W: Write>(pool: &Pool, mut writer: csv::Writer<W>) -> Result<usize> {
    let articles = all_ordered_by_published(pool).await?;
    writer.write_record([
        "published_at",
        "fetched_at",
        "source",
        "url",
        "title",
        "body",
        "language",
    ])?;
    for article in &articles {
        writer.write_record([
            article.published_at.to_rfc3339(),
            article.fetched_at.to_rfc3339(),
            article.source.clone(),
            article.url.clone(),
            article.title.clone(),
            article.body.clone(),
            article.language.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(articles.len())
}
