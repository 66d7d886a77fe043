//! Runtime configuration read from the environment (and `.env`).

use anyhow::Context;
use lexideck_core::algorithm::DEFAULT_ALGORITHM;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_REVIEW_MODEL: &str = "gpt-5-mini";

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub review_model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Scheduler name, see `lexideck_core::get_algorithm`
    pub algorithm: String,
    /// Absent when OPENAI_API_KEY is unset; answer grading is then unavailable.
    pub ai: Option<AiConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("PORT must be a port number, got {:?}", port))?,
            None => DEFAULT_PORT,
        };

        let algorithm =
            lookup("SCHEDULING_ALGORITHM").unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());

        let ai = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| AiConfig {
                api_key,
                base_url: lookup("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                review_model: lookup("OPENAI_REVIEW_MODEL")
                    .unwrap_or_else(|| DEFAULT_REVIEW_MODEL.to_string()),
            });

        Ok(Self {
            database_url,
            host,
            port,
            algorithm,
            ai,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/lexideck")]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert_eq!(config.algorithm, "simple_fsrs");
        assert!(config.ai.is_none());
    }

    #[test]
    fn test_database_url_required() {
        let err = config(&[]).unwrap_err();
        assert_eq!(err.to_string(), "DATABASE_URL must be set");
    }

    #[test]
    fn test_invalid_port() {
        assert!(config(&[("DATABASE_URL", "x"), ("PORT", "http")]).is_err());
    }

    #[test]
    fn test_ai_settings() {
        let config = config(&[
            ("DATABASE_URL", "x"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_REVIEW_MODEL", "gpt-5"),
        ])
        .unwrap();
        let ai = config.ai.unwrap();
        assert_eq!(ai.base_url, "https://api.openai.com");
        assert_eq!(ai.review_model, "gpt-5");
    }

    #[test]
    fn test_blank_api_key_disables_ai() {
        let config = config(&[("DATABASE_URL", "x"), ("OPENAI_API_KEY", "  ")]).unwrap();
        assert!(config.ai.is_none());
    }
}
