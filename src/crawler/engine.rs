use crate::html::{clean_html, clip_text, extract_body_text, extract_candidate_urls, extract_published_at, extract_title};
use crate::llm::prompt::{build_prompt, PromptInputs};
use crate::llm::LlmClient;
use crate::store::articles::{store_if_quality, ArticleDraft};
use crate::store::queue::{self, CrawlQueueItem};
use crate::store::runs::{self, CrawlRun, RunOutcome, RunStatus, RunStatusOutcome};
use crate::store::seeds::{self, CrawlSeed};
use crate::store::{config as store_config, Pool};
use crate::Result;
use scraper::Html;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Default)]
struct CrawlStats {
    pages_processed: i32,
    articles_created: i32,
    queued_urls: i32,
}

pub struct CrawlEngine {
    pool: Pool,
    http: reqwest::Client,
    llm: LlmClient,
    config: store_config::CrawlerConfig,
}

impl CrawlEngine {
    pub async fn new(pool: Pool, fetch_timeout_seconds: u64, llm_timeout_seconds: u64) -> Result<Self> {
        let config = store_config::get_or_create_config(&pool).await?;
        let http = super::fetch::build_http_client(&config.user_agent, fetch_timeout_seconds)?;
        let llm = LlmClient::new(&config, llm_timeout_seconds)?;
        Ok(Self { pool, http, llm, config })
    }

    /// Runs a crawl to completion: claims batches until the frontier is
    /// empty or `max_pages_per_run` steps have run (0 means unlimited),
    /// pausing `request_delay_seconds` between steps. Always finalizes
    /// the run row, even on error — a step failure fails the run, it
    /// doesn't panic the process.
    pub async fn run(&self, existing_run: Option<CrawlRun>) -> Result<CrawlRun> {
        let run = match existing_run {
            Some(run) if run.status() == RunStatus::Running => run,
            Some(run) => runs::restart_run(&self.pool, run.id).await?,
            None => runs::create_run(&self.pool, "", true).await?,
        };

        let mut stats = CrawlStats::default();
        let outcome = self.run_loop(&run, &mut stats).await;

        let (status, last_error) = match &outcome {
            Ok(()) => (RunStatusOutcome::Done, String::new()),
            Err(err) => (RunStatusOutcome::Failed, err.to_string().chars().take(2000).collect()),
        };
        runs::finalize_run(
            &self.pool,
            run.id,
            RunOutcome {
                status,
                pages_processed: stats.pages_processed,
                articles_created: stats.articles_created,
                queued_urls: stats.queued_urls,
            },
            &last_error,
        )
        .await?;

        runs::get_run(&self.pool, run.id).await.map_err(Into::into)
    }

    async fn run_loop(&self, run: &CrawlRun, stats: &mut CrawlStats) -> Result<()> {
        self.ensure_seed_queue().await?;
        let pages_target = self.config.max_pages_per_run;
        let unlimited = pages_target <= 0;
        let mut page_count = 0i32;

        loop {
            if !unlimited && page_count >= pages_target {
                break;
            }
            let active_seeds = self.active_seeds().await?;
            let target_batch_size = active_seeds.len().max(1);
            let batch = self.next_pending_batch(&active_seeds, target_batch_size).await?;
            if batch.is_empty() {
                break;
            }
            let processed = self
                .process_step(batch, run.id, &run.objective, run.use_llm_filtering, target_batch_size, stats)
                .await?;
            stats.pages_processed += processed;
            page_count += 1;
            tokio::time::sleep(Duration::from_secs_f64(self.config.request_delay_seconds.max(0.0))).await;
        }
        Ok(())
    }

    async fn ensure_seed_queue(&self) -> Result<()> {
        let seeds = self.active_seeds().await?;
        queue::ensure_seed_queue(&self.pool, &seeds).await?;
        Ok(())
    }

    async fn active_seeds(&self) -> Result<Vec<CrawlSeed>> {
        Ok(seeds::active_seeds(&self.pool, self.config.id).await?)
    }

    /// One claim attempt per active seed first (breadth across seeds),
    /// then top up with whatever else is pending until `target_size`.
    async fn next_pending_batch(
        &self,
        active_seeds: &[CrawlSeed],
        target_size: usize,
    ) -> Result<Vec<CrawlQueueItem>> {
        let mut batch = Vec::new();
        for seed in active_seeds {
            if let Some(item) = queue::claim_next_pending_for_seed(&self.pool, seed).await? {
                batch.push(item);
            }
        }
        while batch.len() < target_size {
            let exclude: Vec<i64> = batch.iter().map(|item| item.id).collect();
            match queue::claim_next_pending_any(&self.pool, &exclude).await? {
                Some(item) => batch.push(item),
                None => break,
            }
        }
        Ok(batch)
    }

    async fn process_step(
        &self,
        items: Vec<CrawlQueueItem>,
        run_id: i64,
        objective: &str,
        use_llm_filtering: bool,
        target_size: usize,
        stats: &mut CrawlStats,
    ) -> Result<i32> {
        let item_count = items.len() as i32;
        let mut payloads = Vec::new();
        let mut seed_depth: HashMap<String, i32> = HashMap::new();

        for item in items {
            let seed_url = if item.seed_url.is_empty() { item.url.clone() } else { item.seed_url.clone() };
            let depth_entry = seed_depth.entry(seed_url.clone()).or_insert(item.depth);
            if item.depth < *depth_entry {
                *depth_entry = item.depth;
            }

            match self.fetch_and_process_page(&item, &seed_url).await {
                Ok(payload) => payloads.push(payload),
                Err(err) => {
                    warn!(url = %item.url, error = %err, "fetch failed");
                    let clipped: String = err.to_string().chars().take(2000).collect();
                    queue::mark_failed(&self.pool, item.id, &clipped).await?;
                    if let Some(seed_id) = item.seed_id {
                        seeds::mark_failed(&self.pool, seed_id, &clipped).await?;
                    }
                }
            }
        }

        if payloads.is_empty() {
            return Ok(item_count);
        }

        let seed_urls: Vec<String> = payloads.iter().map(|p| p.seed_url.clone()).collect();
        let mut unique_seed_urls = Vec::new();
        for seed_url in &seed_urls {
            if !unique_seed_urls.contains(seed_url) {
                unique_seed_urls.push(seed_url.clone());
            }
        }

        let context = build_context(&payloads);
        let candidate_block = build_candidate_block(&payloads);
        let candidate_pool: Vec<String> = payloads.iter().flat_map(|p| p.candidate_urls.clone()).collect();

        let prompt = build_prompt(
            &self.config.prompt_template,
            &PromptInputs {
                seed_urls: &unique_seed_urls,
                context: &context,
                candidate_urls: &candidate_block,
                objective,
                max_next_urls: self.config.max_next_urls,
                max_articles: self.config.max_articles,
                max_article_chars: self.config.max_article_chars,
            },
        );

        let used_llm = use_llm_filtering && self.llm.enabled();
        let llm_result = if used_llm { self.llm.extract(&prompt).await } else { None };

        let selections = match &llm_result {
            Some(result) => {
                let created = self.store_llm_articles(&result.articles, &payloads[0].url).await?;
                stats.articles_created += created;
                super::next_url::assign_next_urls(
                    &result.next_urls_by_seed,
                    &result.next_urls,
                    &unique_seed_urls,
                    target_size,
                    &candidate_pool,
                )
            }
            None if used_llm => {
                // LLM enabled but the call failed or returned nothing
                // usable: fall through with no selections from it, same
                // as an empty result.
                super::next_url::assign_next_urls(&[], &[], &unique_seed_urls, target_size, &[])
            }
            None => {
                let mut created = 0;
                for payload in &payloads {
                    if let Some(draft) = extract_article_heuristically(payload, self.config.max_article_chars as usize) {
                        if store_if_quality(&self.pool, &draft, self.config.max_article_chars as usize).await? {
                            created += 1;
                        }
                    }
                }
                stats.articles_created += created;
                let next_urls = super::next_url::select_next_urls(&candidate_pool, target_size.max(1));
                super::next_url::assign_next_urls(&[], &next_urls, &unique_seed_urls, target_size, &candidate_pool)
            }
        };

        let mut added = 0;
        for (seed_url, url) in selections {
            if self.enqueue_next_url(&seed_url, &url, &payloads, &seed_depth).await? {
                added += 1;
            }
        }
        stats.queued_urls += added;

        for payload in &payloads {
            queue::mark_done(&self.pool, payload.item_id).await?;
            if let Some(seed_id) = payload.seed_id {
                seeds::mark_fetched(&self.pool, seed_id).await?;
            }
        }

        let _ = run_id;
        Ok(item_count)
    }

    async fn fetch_and_process_page(&self, item: &CrawlQueueItem, seed_url: &str) -> Result<PagePayload> {
        let resp = self.http.get(&item.url).send().await?;
        if !resp.status().is_success() {
            return Err(crate::CrawlError::Http {
                url: item.url.clone(),
                source: resp.error_for_status().unwrap_err(),
            });
        }
        let html = resp.text().await?;
        let cleaned_text = clean_html(&html, self.config.max_context_chars as usize);
        if cleaned_text.trim().is_empty() {
            return Err(crate::CrawlError::EmptyContext { url: item.url.clone() });
        }
        let candidate_urls =
            extract_candidate_urls(&html, &item.url, seed_url, self.config.allow_external_domains);

        info!(url = %item.url, candidates = candidate_urls.len(), "fetched page");

        Ok(PagePayload {
            item_id: item.id,
            seed_id: item.seed_id,
            seed_url: seed_url.to_string(),
            url: item.url.clone(),
            html,
            cleaned_text,
            candidate_urls,
        })
    }

    async fn store_llm_articles(&self, entries: &[crate::llm::response::ArticleEntry], fallback_url: &str) -> Result<i32> {
        let mut created = 0;
        for entry in entries {
            let mut url = entry.url.clone().unwrap_or_default();
            url = url.trim().to_string();
            if url.is_empty() {
                url = fallback_url.to_string();
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                if let Ok(base) = Url::parse(fallback_url) {
                    if let Ok(joined) = base.join(&url) {
                        url = joined.to_string();
                    }
                }
            }
            let title = entry.title.clone().unwrap_or_default().trim().to_string();
            let body = entry.body.clone().unwrap_or_default().trim().to_string();
            if title.is_empty() && body.is_empty() {
                continue;
            }
            let published_at = entry
                .published_at
                .as_deref()
                .and_then(crate::html::extract::parse_datetime);
            let source = entry
                .source
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| host_of(&url));
            let draft = ArticleDraft { url, title, body, source, published_at };
            if store_if_quality(&self.pool, &draft, self.config.max_article_chars as usize).await? {
                created += 1;
            }
        }
        Ok(created)
    }

    async fn enqueue_next_url(
        &self,
        seed_url: &str,
        url: &str,
        payloads: &[PagePayload],
        seed_depth: &HashMap<String, i32>,
    ) -> Result<bool> {
        let depth = *seed_depth.get(seed_url).unwrap_or(&0);
        if self.config.max_depth > 0 && depth >= self.config.max_depth {
            return Ok(false);
        }
        let url = url.trim();
        if url.is_empty() {
            return Ok(false);
        }
        let absolute = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if let Ok(base) = Url::parse(seed_url) {
            base.join(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
        } else {
            url.to_string()
        };
        let seed_id = payloads.iter().find(|p| p.seed_url == seed_url).and_then(|p| p.seed_id);
        let created = queue::enqueue(&self.pool, &absolute, seed_id, seed_url, depth + 1).await?;
        Ok(created)
    }
}

struct PagePayload {
    item_id: i64,
    seed_id: Option<i64>,
    seed_url: String,
    url: String,
    html: String,
    cleaned_text: String,
    candidate_urls: Vec<String>,
}

fn build_context(payloads: &[PagePayload]) -> String {
    payloads
        .iter()
        .map(|p| format!("Seed: {}\nURL: {}\n{}", p.seed_url, p.url, p.cleaned_text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

fn build_candidate_block(payloads: &[PagePayload]) -> String {
    payloads
        .iter()
        .map(|p| {
            let urls = p.candidate_urls.iter().take(200).map(|u| format!("- {u}")).collect::<Vec<_>>().join("\n");
            let urls = if urls.is_empty() { "(none)".to_string() } else { urls };
            format!("Seed: {}\n{urls}", p.seed_url)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn extract_article_heuristically(payload: &PagePayload, max_article_chars: usize) -> Option<ArticleDraft> {
    let document = Html::parse_document(&payload.html);
    let title = extract_title(&document).unwrap_or_default();
    let published_at = extract_published_at(&document);
    let mut body = extract_body_text(&document);
    if body.is_empty() {
        body = payload.cleaned_text.clone();
    }
    if title.is_empty() && body.is_empty() {
        return None;
    }
    let body = clip_text(&body, max_article_chars);
    Some(ArticleDraft {
        url: payload.url.clone(),
        title,
        body,
        source: host_of(&payload.url),
        published_at,
    })
}

fn host_of(url: &str) -> String {
    Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)).unwrap_or_default()
}
