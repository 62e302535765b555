use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use url::Url;

/// Resolves every `<a href>` against `base_url`, keeps only http(s)
/// absolute URLs, de-duplicates while preserving first-seen order, and
/// (unless `allow_external_domains`) drops anything whose host differs
/// from the seed's host.
pub fn extract_candidate_urls(
    html: &str,
    base_url: &str,
    seed_url: &str,
    allow_external_domains: bool,
) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let Ok(base) = Url::parse(base_url) else {
        return Vec::new();
    };
    let seed_host = Url::parse(seed_url).ok().and_then(|u| u.host_str().map(str::to_string));

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.is_empty() {
            continue;
        }
        let Ok(absolute) = base.join(href) else {
            continue;
        };
        if absolute.scheme() != "http" && absolute.scheme() != "https" {
            continue;
        }
        if !allow_external_domains {
            if let Some(seed_host) = &seed_host {
                if absolute.host_str() != Some(seed_host.as_str()) {
                    continue;
                }
            }
        }
        let absolute = absolute.to_string();
        if seen.insert(absolute.clone()) {
            out.push(absolute);
        }
    }
    out
}

/// `og:title`, then `twitter:title`, then `<title>`.
pub fn extract_title(document: &Html) -> Option<String> {
    meta_content(document, "property", "og:title")
        .or_else(|| meta_content(document, "name", "twitter:title"))
        .or_else(|| {
            Selector::parse("title")
                .ok()
                .and_then(|selector| document.select(&selector).next())
                .map(|el| el.text().collect::<String>())
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `article:published_time` meta tag, then the first `<time datetime>`.
pub fn extract_published_at(document: &Html) -> Option<DateTime<Utc>> {
    let raw = meta_content(document, "property", "article:published_time").or_else(|| {
        Selector::parse("time[datetime]")
            .ok()
            .and_then(|selector| document.select(&selector).next())
            .and_then(|el| el.value().attr("datetime"))
            .map(str::to_string)
    })?;
    parse_datetime(&raw)
}

pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Prefers `<article>`, then `<main>`, then `<body>`; within that
/// element, keeps paragraphs of at least 40 characters (boilerplate
/// filter), falling back to every non-empty paragraph if none clear
/// that bar.
pub fn extract_body_text(document: &Html) -> String {
    let container = ["article", "main", "body"]
        .iter()
        .find_map(|tag| {
            let selector = Selector::parse(tag).ok()?;
            document.select(&selector).next()
        });
    let Some(container) = container else {
        return String::new();
    };
    let Ok(p_selector) = Selector::parse("p") else {
        return String::new();
    };
    let paragraphs: Vec<String> = container
        .select(&p_selector)
        .map(|p| p.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .collect();
    let long_enough: Vec<&String> = paragraphs.iter().filter(|p| p.chars().count() >= 40).collect();
    let chosen: Vec<&String> = if long_enough.is_empty() {
        paragraphs.iter().filter(|p| !p.is_empty()).collect()
    } else {
        long_enough
    };
    chosen
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn meta_content(document: &Html, attr: &str, value: &str) -> Option<String> {
    let selector = Selector::parse(&format!("meta[{attr}=\"{value}\"]")).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_internal_links_only_by_default() {
        let html = r#"<a href="/a">a</a><a href="https://other.example/b">b</a>"#;
        let urls = extract_candidate_urls(html, "https://seed.example/page", "https://seed.example/", false);
        assert_eq!(urls, vec!["https://seed.example/a".to_string()]);
    }

    #[test]
    fn keeps_external_links_when_allowed() {
        let html = r#"<a href="https://other.example/b">b</a>"#;
        let urls = extract_candidate_urls(html, "https://seed.example/page", "https://seed.example/", true);
        assert_eq!(urls, vec!["https://other.example/b".to_string()]);
    }

    #[test]
    fn skips_non_http_schemes() {
        let html = r#"<a href="javascript:void(0)">x</a><a href="mailto:a@b.com">y</a>"#;
        let urls = extract_candidate_urls(html, "https://seed.example/page", "https://seed.example/", true);
        assert!(urls.is_empty());
    }

    #[test]
    fn prefers_og_title_over_title_tag() {
        let html = r#"<html><head><meta property="og:title" content="OG"><title>Fallback</title></head></html>"#;
        let doc = Html::parse_document(html);
        assert_eq!(extract_title(&doc), Some("OG".to_string()));
    }

    #[test]
    fn body_prefers_long_paragraphs() {
        let html = "<article><p>short</p><p>This paragraph is long enough to clear the boilerplate filter.</p></article>";
        let doc = Html::parse_document(html);
        let body = extract_body_text(&doc);
        assert!(body.contains("long enough"));
        assert!(!body.contains("short"));
    }
}
