use super::response::{parse_response, LlmResult};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    HuggingFace,
    Google,
    ApiFreeLlm,
}

impl LlmProvider {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "huggingface" => Self::HuggingFace,
            "apifreellm" => Self::ApiFreeLlm,
            "google" | "gemini" | "google_ai" | "ai_studio" => Self::Google,
            _ => Self::OpenAi,
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::HuggingFace => "https://api-inference.huggingface.co",
            Self::ApiFreeLlm => "https://apifreellm.com",
            Self::Google => "https://generativelanguage.googleapis.com/v1beta",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }
}

pub struct ProviderRequest<'a> {
    pub client: &'a reqwest::Client,
    pub base_url: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
    pub temperature: f64,
    pub max_output_tokens: i32,
    pub prompt: &'a str,
}

pub async fn extract_openai(req: &ProviderRequest<'_>) -> Option<LlmResult> {
    let payload = json!({
        "model": req.model,
        "temperature": req.temperature,
        "max_tokens": req.max_output_tokens,
        "response_format": {"type": "json_object"},
        "messages": [
            {"role": "system", "content": "You are a high-precision news extraction and URL selection system. Only return valid JSON."},
            {"role": "user", "content": req.prompt},
        ],
    });
    let resp = req
        .client
        .post(format!("{}/chat/completions", req.base_url.trim_end_matches('/')))
        .bearer_auth(req.api_key)
        .json(&payload)
        .send()
        .await
        .ok()?;
    if !resp.status().is_success() {
        return None;
    }
    let data: Value = resp.json().await.ok()?;
    let content = data
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?;
    parse_response(content)
}

pub async fn extract_huggingface(req: &ProviderRequest<'_>) -> Option<LlmResult> {
    let payload = json!({
        "inputs": format!("Return ONLY valid JSON.\n{}", req.prompt),
        "parameters": {
            "temperature": req.temperature,
            "max_new_tokens": req.max_output_tokens,
            "return_full_text": false,
        },
    });
    let resp = req
        .client
        .post(format!("{}/models/{}", req.base_url.trim_end_matches('/'), req.model))
        .bearer_auth(req.api_key)
        .json(&payload)
        .send()
        .await
        .ok()?;
    if !resp.status().is_success() {
        return None;
    }
    let data: Value = resp.json().await.ok()?;
    let content = extract_huggingface_text(&data)?;
    parse_response(&content)
}

fn extract_huggingface_text(data: &Value) -> Option<String> {
    if let Some(items) = data.as_array() {
        let first = items.first()?;
        return first.get("generated_text")?.as_str().map(str::to_string);
    }
    if let Some(obj) = data.as_object() {
        if let Some(text) = obj.get("generated_text").and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    None
}

pub async fn extract_apifreellm(req: &ProviderRequest<'_>) -> Option<LlmResult> {
    let payload = json!({"message": req.prompt});
    let mut request = req
        .client
        .post(format!("{}/api/chat", req.base_url.trim_end_matches('/')))
        .json(&payload);
    if !req.api_key.is_empty() {
        request = request.bearer_auth(req.api_key);
    }
    let resp = request.send().await.ok()?;
    if !resp.status().is_success() {
        return None;
    }
    let data: Value = resp.json().await.ok()?;
    let content = extract_apifreellm_text(&data)?;
    parse_response(&content)
}

fn extract_apifreellm_text(data: &Value) -> Option<String> {
    let obj = data.as_object()?;
    for key in ["response", "message", "content", "text"] {
        if let Some(value) = obj.get(key).and_then(Value::as_str) {
            if !value.trim().is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

pub async fn extract_google(req: &ProviderRequest<'_>) -> Option<LlmResult> {
    let payload = json!({
        "contents": [{"role": "user", "parts": [{"text": req.prompt}]}],
        "generationConfig": {
            "temperature": req.temperature,
            "maxOutputTokens": req.max_output_tokens,
        },
    });
    let resp = req
        .client
        .post(format!(
            "{}/models/{}:generateContent",
            req.base_url.trim_end_matches('/'),
            req.model
        ))
        .header("x-goog-api-key", req.api_key)
        .json(&payload)
        .send()
        .await
        .ok()?;
    if !resp.status().is_success() {
        return None;
    }
    let data: Value = resp.json().await.ok()?;
    let content = extract_google_text(&data)?;
    parse_response(&content)
}

fn extract_google_text(data: &Value) -> Option<String> {
    let candidates = data.get("candidates")?.as_array()?;
    let parts = candidates.first()?.get("content")?.get("parts")?.as_array()?;
    let texts: Vec<&str> = parts.iter().filter_map(|part| part.get("text")?.as_str()).collect();
    if texts.is_empty() {
        return None;
    }
    Some(texts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_google_aliases() {
        for alias in ["google", "gemini", "google_ai", "ai_studio", "GOOGLE"] {
            assert_eq!(LlmProvider::from_config_str(alias), LlmProvider::Google);
        }
    }

    #[test]
    fn defaults_unknown_provider_to_openai() {
        assert_eq!(LlmProvider::from_config_str("whatever"), LlmProvider::OpenAi);
    }

    #[test]
    fn extracts_huggingface_list_shape() {
        let data = json!([{"generated_text": "{}"}]);
        assert_eq!(extract_huggingface_text(&data), Some("{}".to_string()));
    }

    #[test]
    fn huggingface_error_object_yields_none() {
        let data = json!({"error": "rate limited"});
        assert_eq!(extract_huggingface_text(&data), None);
    }

    #[test]
    fn google_concatenates_parts() {
        let data = json!({
            "candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}]}}]
        });
        assert_eq!(extract_google_text(&data), Some("a\nb".to_string()));
    }
}
