//! LLM-backed article extraction and next-URL selection.
//!
//! [`LlmClient`] hides the provider differences behind one `extract`
//! call; [`prompt::build_prompt`] renders the operator-configured
//! template; [`response::parse_response`] decodes whatever JSON object
//! the provider handed back.

pub mod prompt;
pub mod providers;
pub mod response;

use crate::store::config::CrawlerConfig;
use providers::{extract_apifreellm, extract_google, extract_huggingface, extract_openai, LlmProvider, ProviderRequest};
use response::LlmResult;
use std::time::Duration;

pub struct LlmClient {
    provider: LlmProvider,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_output_tokens: i32,
    enabled_flag: bool,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: &CrawlerConfig, llm_timeout_seconds: u64) -> crate::Result<Self> {
        let provider = LlmProvider::from_config_str(&config.llm_provider);
        let base_url = if config.llm_base_url.is_empty() {
            provider.default_base_url().to_string()
        } else {
            config.llm_base_url.clone()
        };
        let http = reqwest::Client::builder().timeout(Duration::from_secs(llm_timeout_seconds)).build()?;

        Ok(Self {
            provider,
            base_url,
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_output_tokens: config.llm_max_output_tokens,
            enabled_flag: config.llm_enabled,
            http,
        })
    }

    /// `apifreellm` works keyless; every other provider needs an API
    /// key to be considered enabled.
    pub fn enabled(&self) -> bool {
        if !self.enabled_flag {
            return false;
        }
        if self.provider == LlmProvider::ApiFreeLlm {
            return true;
        }
        !self.api_key.is_empty()
    }

    pub async fn extract(&self, prompt: &str) -> Option<LlmResult> {
        if !self.enabled() {
            return None;
        }
        let req = ProviderRequest {
            client: &self.http,
            base_url: &self.base_url,
            api_key: &self.api_key,
            model: &self.model,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            prompt,
        };
        match self.provider {
            LlmProvider::HuggingFace => extract_huggingface(&req).await,
            LlmProvider::ApiFreeLlm => extract_apifreellm(&req).await,
            LlmProvider::Google => extract_google(&req).await,
            LlmProvider::OpenAi => extract_openai(&req).await,
        }
    }
}
