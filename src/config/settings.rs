use crate::ConfigError;
use serde::Deserialize;
use std::path::Path;

fn default_fetch_timeout() -> u64 {
    20
}

fn default_llm_timeout() -> u64 {
    45
}

/// Bootstrap settings: read once at startup, before any database
/// connection exists. `fetch_timeout_seconds`/`llm_timeout_seconds` can
/// be overridden by `CRAWLER_FETCH_TIMEOUT_SECONDS`/
/// `CRAWLER_LLM_TIMEOUT_SECONDS` so operators don't need to edit the
/// file for a one-off tuning change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    pub database_url: String,

    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,

    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_seconds: u64,
}

impl Settings {
    fn apply_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("CRAWLER_FETCH_TIMEOUT_SECONDS") {
            if let Ok(secs) = v.parse() {
                self.fetch_timeout_seconds = secs;
            }
        }
        if let Ok(v) = std::env::var("CRAWLER_LLM_TIMEOUT_SECONDS") {
            if let Ok(secs) = v.parse() {
                self.llm_timeout_seconds = secs;
            }
        }
        if let Ok(v) = std::env::var("DATABASE_URL") {
            self.database_url = v;
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Validation("database_url is required".into()));
        }
        Ok(())
    }
}

/// Loads settings from a TOML file, then layers env var overrides on top.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&content)?;
    let settings = settings.apply_env_overrides();
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_minimal_config() {
        let file = write_temp(r#"database-url = "postgres://localhost/newsloom""#);
        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.database_url, "postgres://localhost/newsloom");
        assert_eq!(settings.fetch_timeout_seconds, 20);
        assert_eq!(settings.llm_timeout_seconds, 45);
    }

    #[test]
    fn rejects_empty_database_url() {
        let file = write_temp(r#"database-url = """#);
        let result = load_settings(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn rejects_missing_file() {
        let result = load_settings(Path::new("/nonexistent/newsloom.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let file = write_temp("not valid toml {{{");
        let result = load_settings(file.path());
        assert!(result.is_err());
    }
}
