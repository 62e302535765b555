use scraper::{Html, Selector};

const STRIPPED_TAGS: &[&str] = &["script", "style", "noscript", "header", "footer", "nav", "aside", "form"];

/// Strips chrome tags and collapses the remaining text to one
/// non-empty line per original line, then clips to `max_chars`.
pub fn clean_html(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();
    collect_text_lines(&document, &mut lines);
    clip_text(&lines.join("\n"), max_chars)
}

fn collect_text_lines(document: &Html, out: &mut Vec<String>) {
    let mut skipped_nodes = std::collections::HashSet::new();
    if let Ok(skip) = Selector::parse(&STRIPPED_TAGS.join(", ")) {
        for element in document.select(&skip) {
            for node in element.descendants() {
                skipped_nodes.insert(node.id());
            }
        }
    }

    let root = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    for descendant in root.descendants() {
        if skipped_nodes.contains(&descendant.id()) {
            continue;
        }
        if let Some(text) = descendant.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
    }
}

/// Preserves head and tail of `text` when it exceeds `max_chars`,
/// splitting 70/30 so the opening (most likely to carry a headline or
/// lede) and the very end both survive truncation.
pub fn clip_text(text: &str, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let head = (max_chars as f64 * 0.7) as usize;
    let tail = max_chars - head;
    let head_part: String = chars[..head].iter().collect();
    let tail_part: String = chars[chars.len() - tail..].iter().collect();
    format!("{head_part}\n...\n{tail_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_text_leaves_short_text_untouched() {
        assert_eq!(clip_text("short", 100), "short");
    }

    #[test]
    fn clip_text_splits_head_and_tail() {
        let text = "a".repeat(50) + &"b".repeat(50);
        let clipped = clip_text(&text, 20);
        assert!(clipped.contains("...\n"));
        assert!(clipped.starts_with("aaaa"));
        assert!(clipped.ends_with("bbbb"));
    }

    #[test]
    fn clean_html_strips_script_and_nav() {
        let html = "<html><body><nav>menu</nav><p>Real article text.</p><script>evil()</script></body></html>";
        let cleaned = clean_html(html, 10_000);
        assert!(cleaned.contains("Real article text."));
        assert!(!cleaned.contains("menu"));
        assert!(!cleaned.contains("evil()"));
    }
}
