use std::time::Duration;

/// Builds the shared HTTP client every fetch in a run goes through.
/// Redirects are left to `reqwest`'s default policy — the engine has
/// no need to inspect the chain, only the final response.
pub fn build_http_client(user_agent: &str, timeout_seconds: u64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent.to_string())
        .timeout(Duration::from_secs(timeout_seconds))
        .gzip(true)
        .brotli(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_client_with_custom_user_agent() {
        let client = build_http_client("newsloom-crawler/1.0", 20);
        assert!(client.is_ok());
    }
}
