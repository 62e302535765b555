/// Default value for `CrawlerConfig.prompt_template`. Seven named
/// placeholders are substituted at format time: `{seed_urls}`,
/// `{seed_url}`, `{context}`, `{candidate_urls}`, `{max_next_urls}`,
/// `{max_articles}`, `{max_article_chars}`.
pub const DEFAULT_PROMPT: &str = "You are a high-precision news extraction and URL selection system.\n\
Task: From the combined context of multiple seed pages, extract news items and select the best next URLs.\n\
Seed/Current URLs:\n\
{seed_urls}\n\n\
Context (cleaned text from all pages):\n\
{context}\n\n\
Candidate URLs by seed:\n\
{candidate_urls}\n\n\
Return ONLY valid JSON with this schema:\n\
{{\n\
  \"next_urls_by_seed\": [\n\
    {{\n\
      \"seed_url\": \"https://seed.example\",\n\
      \"next_url\": \"https://next.example\"\n\
    }}\n\
  ],\n\
  \"articles\": [\n\
    {{\n\
      \"url\": \"https://...\",\n\
      \"title\": \"...\",\n\
      \"published_at\": \"ISO-8601 timestamp if present\",\n\
      \"source\": \"example.com\",\n\
      \"body\": \"full article text from the context\"\n\
    }}\n\
  ]\n\
}}\n\n\
Rules:\n\
- Choose one next_url per seed_url when possible.\n\
- Extract up to {max_articles} articles.\n\
- Keep each body under ~{max_article_chars} characters.\n\
- Do not invent facts, URLs, or timestamps.\n";

pub struct PromptInputs<'a> {
    pub seed_urls: &'a [String],
    pub context: &'a str,
    pub candidate_urls: &'a str,
    pub objective: &'a str,
    pub max_next_urls: i32,
    pub max_articles: i32,
    pub max_article_chars: i32,
}

/// Substitutes the named placeholders into `template`. `{{`/`}}` in the
/// template (the literal braces in the JSON schema example) must be
/// escaped as `{{{{`/`}}}}` if the template is edited, matching the
/// default template above.
pub fn build_prompt(template: &str, inputs: &PromptInputs) -> String {
    let seed_block = if inputs.seed_urls.is_empty() {
        "(none)".to_string()
    } else {
        inputs
            .seed_urls
            .iter()
            .map(|u| format!("- {u}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let objective = inputs.objective.trim();
    let context = if objective.is_empty() {
        inputs.context.to_string()
    } else {
        format!("Objective:\n{objective}\n\n{}", inputs.context)
    };
    let candidate_urls = if inputs.candidate_urls.is_empty() {
        "(none)"
    } else {
        inputs.candidate_urls
    };

    let seed_url = inputs.seed_urls.first().map(String::as_str).unwrap_or("");

    template
        .replace("{seed_urls}", &seed_block)
        .replace("{seed_url}", seed_url)
        .replace("{context}", &context)
        .replace("{candidate_urls}", candidate_urls)
        .replace("{max_next_urls}", &inputs.max_next_urls.to_string())
        .replace("{max_articles}", &inputs.max_articles.to_string())
        .replace("{max_article_chars}", &inputs.max_article_chars.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_all_placeholders() {
        let seeds = vec!["https://a.example".to_string()];
        let inputs = PromptInputs {
            seed_urls: &seeds,
            context: "body text",
            candidate_urls: "- https://a.example/next",
            objective: "",
            max_next_urls: 10,
            max_articles: 20,
            max_article_chars: 2000,
        };
        let out = build_prompt(DEFAULT_PROMPT, &inputs);
        assert!(out.contains("https://a.example"));
        assert!(out.contains("body text"));
        assert!(out.contains("Extract up to 20 articles"));
        assert!(!out.contains("{max_articles}"));
    }

    #[test]
    fn prepends_objective_when_present() {
        let seeds = vec!["https://a.example".to_string()];
        let inputs = PromptInputs {
            seed_urls: &seeds,
            context: "body text",
            candidate_urls: "",
            objective: "focus on markets",
            max_next_urls: 10,
            max_articles: 20,
            max_article_chars: 2000,
        };
        let out = build_prompt(DEFAULT_PROMPT, &inputs);
        assert!(out.contains("Objective:\nfocus on markets"));
        assert!(out.contains("(none)"));
    }

    #[test]
    fn substitutes_singular_seed_url() {
        let seeds = vec!["https://a.example".to_string(), "https://b.example".to_string()];
        let inputs = PromptInputs {
            seed_urls: &seeds,
            context: "",
            candidate_urls: "",
            objective: "",
            max_next_urls: 10,
            max_articles: 20,
            max_article_chars: 2000,
        };
        let out = build_prompt("first seed: {seed_url}", &inputs);
        assert_eq!(out, "first seed: https://a.example");
    }

    #[test]
    fn empty_seed_urls_renders_placeholder() {
        let inputs = PromptInputs {
            seed_urls: &[],
            context: "",
            candidate_urls: "",
            objective: "",
            max_next_urls: 10,
            max_articles: 20,
            max_article_chars: 2000,
        };
        let out = build_prompt(DEFAULT_PROMPT, &inputs);
        assert!(out.contains("(none)"));
    }
}
