use anyhow::{Context, Result};
use dotenvy::dotenv;
use listing_ingest::ai::{OpenAIBackend, DEFAULT_MODEL};
use listing_ingest::fetch::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_ATTEMPTS};
use listing_ingest::{Pipeline, PipelineConfig, ReqwestTransport, RetryPolicy, MAX_NORMALIZED_CHARS};
use std::env;
use std::time::Duration;

/// Pipeline wired to the live network and OpenAI.
pub type LivePipeline = Pipeline<ReqwestTransport, OpenAIBackend>;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub fetch_timeout: Duration,
    pub fetch_max_attempts: u32,
    pub max_normalized_chars: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: lookup("OPENAI_API_KEY")
                .filter(|key| !key.trim().is_empty())
                .context("OPENAI_API_KEY must be set")?,
            openai_model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: lookup("OPENAI_BASE_URL"),
            fetch_timeout: match lookup("FETCH_TIMEOUT_SECS") {
                Some(secs) => Duration::from_secs(
                    secs.parse()
                        .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
                ),
                None => DEFAULT_FETCH_TIMEOUT,
            },
            fetch_max_attempts: match lookup("FETCH_MAX_ATTEMPTS") {
                Some(n) => n.parse().context("FETCH_MAX_ATTEMPTS must be a valid number")?,
                None => DEFAULT_MAX_ATTEMPTS,
            },
            max_normalized_chars: match lookup("MAX_NORMALIZED_CHARS") {
                Some(n) => n.parse().context("MAX_NORMALIZED_CHARS must be a valid number")?,
                None => MAX_NORMALIZED_CHARS,
            },
        })
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            retry: RetryPolicy::default().with_max_attempts(self.fetch_max_attempts),
            max_normalized_chars: self.max_normalized_chars,
        }
    }

    /// Build the production pipeline.
    pub fn build_pipeline(&self) -> Result<LivePipeline> {
        let transport =
            ReqwestTransport::new(self.fetch_timeout).context("Failed to build HTTP transport")?;

        let mut backend = OpenAIBackend::new(&self.openai_api_key).with_model(&self.openai_model);
        if let Some(base_url) = &self.openai_base_url {
            backend = backend.with_base_url(base_url);
        }

        Ok(Pipeline::with_config(
            transport,
            backend,
            self.pipeline_config(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.openai_model, "gpt-4o-mini-2024-07-18");
        assert_eq!(config.openai_base_url, None);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.fetch_max_attempts, 5);
        assert_eq!(config.max_normalized_chars, 40_000);
        assert_eq!(config.pipeline_config(), PipelineConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "3000"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("FETCH_TIMEOUT_SECS", "30"),
            ("FETCH_MAX_ATTEMPTS", "3"),
            ("MAX_NORMALIZED_CHARS", "60000"),
        ]))
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.openai_model, "gpt-4o");
        assert_eq!(config.fetch_timeout, Duration::from_secs(30));

        let pipeline_config = config.pipeline_config();
        assert_eq!(pipeline_config.retry.max_attempts, 3);
        assert_eq!(pipeline_config.max_normalized_chars, 60_000);
    }

    #[test]
    fn test_api_key_required() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let err = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "sk"), ("PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_builds_live_pipeline() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:4010/v1"),
        ]))
        .unwrap();

        let pipeline = config.build_pipeline().unwrap();
        assert_eq!(pipeline.gate().limit(), 40_000);
        assert_eq!(pipeline.extractor().backend().model(), DEFAULT_MODEL);
    }
}
