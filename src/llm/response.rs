use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextUrlBySeed {
    pub seed_url: String,
    pub next_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleEntry {
    pub url: Option<String>,
    pub title: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LlmResult {
    pub next_urls: Vec<String>,
    pub next_urls_by_seed: Vec<NextUrlBySeed>,
    pub articles: Vec<ArticleEntry>,
}

fn as_str(value: &Value, key: &str) -> Option<String> {
    value.get(key)?.as_str().map(str::to_string)
}

/// Decodes a provider's raw text response into an `LlmResult`. Within
/// a field that is list-shaped, individual malformed items (not an
/// object/string where one is expected) are dropped rather than
/// failing the whole parse. But if a top-level field is *present* and
/// not list-shaped at all (a string instead of an array, say), the
/// entire result is rejected — that's a provider that ignored the
/// requested shape, not one that partially complied.
pub fn parse_response(content: &str) -> Option<LlmResult> {
    let data: Value = serde_json::from_str(content).ok()?;
    let obj = data.as_object()?;

    let next_urls = match obj.get("next_urls") {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Some(_) => return None,
    };

    let next_urls_by_seed = match obj.get("next_urls_by_seed") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|entry| {
                let seed_url = entry.get("seed_url")?.as_str()?.to_string();
                let next_url = entry.get("next_url")?.as_str()?.to_string();
                Some(NextUrlBySeed { seed_url, next_url })
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(seed_url, next_url)| {
                Some(NextUrlBySeed {
                    seed_url: seed_url.clone(),
                    next_url: next_url.as_str()?.to_string(),
                })
            })
            .collect(),
        Some(_) => return None,
    };

    let articles = match obj.get("articles") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|entry| ArticleEntry {
                url: as_str(&Value::Object(entry.clone()), "url"),
                title: as_str(&Value::Object(entry.clone()), "title"),
                published_at: as_str(&Value::Object(entry.clone()), "published_at"),
                source: as_str(&Value::Object(entry.clone()), "source"),
                body: as_str(&Value::Object(entry.clone()), "body"),
            })
            .collect(),
        Some(_) => return None,
    };

    Some(LlmResult {
        next_urls,
        next_urls_by_seed,
        articles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_json() {
        assert!(parse_response("not json").is_none());
    }

    #[test]
    fn rejects_json_array_at_top_level() {
        assert!(parse_response("[1, 2, 3]").is_none());
    }

    #[test]
    fn parses_full_shape() {
        let content = r#"{
            "next_urls": ["https://a.example"],
            "next_urls_by_seed": [{"seed_url": "https://seed.example", "next_url": "https://next.example"}],
            "articles": [{"url": "https://a.example", "title": "T", "body": "B", "source": "a.example", "published_at": "2024-01-01T00:00:00Z"}]
        }"#;
        let result = parse_response(content).unwrap();
        assert_eq!(result.next_urls, vec!["https://a.example".to_string()]);
        assert_eq!(result.next_urls_by_seed.len(), 1);
        assert_eq!(result.articles.len(), 1);
    }

    #[test]
    fn accepts_dict_shaped_next_urls_by_seed() {
        let content = r#"{"next_urls_by_seed": {"https://seed.example": "https://next.example"}}"#;
        let result = parse_response(content).unwrap();
        assert_eq!(result.next_urls_by_seed[0].next_url, "https://next.example");
    }

    #[test]
    fn drops_malformed_article_entries() {
        let content = r#"{"articles": ["not an object", {"title": "ok"}]}"#;
        let result = parse_response(content).unwrap();
        assert_eq!(result.articles.len(), 1);
    }

    #[test]
    fn missing_fields_default_to_empty_lists() {
        let result = parse_response("{}").unwrap();
        assert!(result.next_urls.is_empty());
        assert!(result.next_urls_by_seed.is_empty());
        assert!(result.articles.is_empty());
    }

    #[test]
    fn rejects_next_urls_of_wrong_type() {
        assert!(parse_response(r#"{"next_urls": "https://a.example"}"#).is_none());
    }

    #[test]
    fn rejects_next_urls_by_seed_of_wrong_type() {
        assert!(parse_response(r#"{"next_urls_by_seed": "nope"}"#).is_none());
    }

    #[test]
    fn rejects_articles_of_wrong_type() {
        assert!(parse_response(r#"{"articles": "nope"}"#).is_none());
    }
}
