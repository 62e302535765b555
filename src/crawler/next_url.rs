use crate::llm::response::NextUrlBySeed;
use rand::seq::SliceRandom;
use std::collections::HashSet;

const SKIP_TOKENS: &[&str] = &[
    "/login",
    "/signup",
    "/register",
    "/account",
    "/privacy",
    "/terms",
    "/cookie",
    "/contact",
    "/about",
    "/help",
    "/support",
    "/advertise",
    "/subscribe",
    "/newsletter",
    "/rss",
];

/// Filters out account/legal/subscription pages — useful for
/// following links but never worth treating as a next crawl target.
pub fn is_useful_url(url: &str) -> bool {
    let lowered = url.to_lowercase();
    !SKIP_TOKENS.iter().any(|token| lowered.contains(token))
}

/// De-duplicates, filters, and shuffles the candidate pool, returning
/// at most `limit` URLs. Shuffling keeps a crawl from always chasing
/// the first link in document order across every run.
pub fn select_next_urls(candidates: &[String], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls: Vec<String> = candidates
        .iter()
        .filter(|url| !url.is_empty() && is_useful_url(url))
        .filter(|url| seen.insert((*url).clone()))
        .cloned()
        .collect();
    urls.shuffle(&mut rand::thread_rng());
    urls.truncate(limit.max(1));
    urls
}

/// Picks one next URL per seed: the LLM's explicit seed mapping first,
/// then a round-robin walk over its flat `next_urls` list, then a
/// heuristic top-up from the candidate pool until `target_size` is
/// reached. Each stage only contributes a URL that hasn't already been
/// used by an earlier stage in this same step.
pub fn assign_next_urls(
    next_urls_by_seed: &[NextUrlBySeed],
    next_urls: &[String],
    seed_urls: &[String],
    target_size: usize,
    candidate_pool: &[String],
) -> Vec<(String, String)> {
    let seed_urls: Vec<&String> = seed_urls.iter().filter(|u| !u.is_empty()).collect();
    if seed_urls.is_empty() {
        return Vec::new();
    }

    let mut mapping = std::collections::HashMap::new();
    for entry in next_urls_by_seed {
        let seed_url = entry.seed_url.trim();
        let next_url = entry.next_url.trim();
        if !seed_url.is_empty() && !next_url.is_empty() && seed_urls.iter().any(|u| u.as_str() == seed_url) {
            mapping.insert(seed_url.to_string(), next_url.to_string());
        }
    }

    let mut used: HashSet<String> = HashSet::new();
    let mut selections = Vec::new();
    for seed_url in &seed_urls {
        if let Some(next_url) = mapping.get(seed_url.as_str()) {
            if !used.contains(next_url) {
                selections.push(((*seed_url).clone(), next_url.clone()));
                used.insert(next_url.clone());
            }
        }
    }

    if selections.is_empty() && !next_urls.is_empty() {
        for (idx, url) in next_urls.iter().enumerate() {
            let url = url.trim();
            if url.is_empty() || used.contains(url) {
                continue;
            }
            let seed_url = seed_urls[idx % seed_urls.len()];
            selections.push((seed_url.clone(), url.to_string()));
            used.insert(url.to_string());
        }
    }

    let mut fallback: Vec<String> = select_next_urls(candidate_pool, target_size.max(1))
        .into_iter()
        .filter(|u| !used.contains(u))
        .collect();
    let mut seed_index = 0;
    while selections.len() < target_size && !fallback.is_empty() {
        let url = fallback.remove(0);
        if used.contains(&url) {
            continue;
        }
        let seed_url = seed_urls[seed_index % seed_urls.len()];
        seed_index += 1;
        selections.push((seed_url.clone(), url.clone()));
        used.insert(url);
    }
    selections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_skip_tokens() {
        assert!(!is_useful_url("https://example.com/login"));
        assert!(is_useful_url("https://example.com/story/1"));
    }

    #[test]
    fn assign_prefers_llm_seed_mapping() {
        let seed_urls = vec!["https://seed.example".to_string()];
        let mapping = vec![NextUrlBySeed {
            seed_url: "https://seed.example".to_string(),
            next_url: "https://seed.example/next".to_string(),
        }];
        let selections = assign_next_urls(&mapping, &[], &seed_urls, 1, &[]);
        assert_eq!(selections, vec![("https://seed.example".to_string(), "https://seed.example/next".to_string())]);
    }

    #[test]
    fn assign_falls_back_to_flat_list_round_robin() {
        let seed_urls = vec!["https://a.example".to_string(), "https://b.example".to_string()];
        let next_urls = vec!["https://x.example".to_string(), "https://y.example".to_string()];
        let selections = assign_next_urls(&[], &next_urls, &seed_urls, 2, &[]);
        assert_eq!(selections.len(), 2);
        assert_eq!(selections[0].0, "https://a.example");
        assert_eq!(selections[1].0, "https://b.example");
    }

    #[test]
    fn assign_tops_up_from_candidate_pool() {
        let seed_urls = vec!["https://a.example".to_string()];
        let candidates = vec!["https://a.example/story".to_string()];
        let selections = assign_next_urls(&[], &[], &seed_urls, 1, &candidates);
        assert_eq!(selections.len(), 1);
        assert_eq!(selections[0].1, "https://a.example/story");
    }

    #[test]
    fn assign_returns_empty_without_seeds() {
        let selections = assign_next_urls(&[], &[], &[], 1, &[]);
        assert!(selections.is_empty());
    }
}
