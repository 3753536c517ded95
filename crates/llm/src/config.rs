use std::sync::Arc;
use std::time::Duration;

use crate::client::OpenAiClient;
use crate::error::GenerationError;
use crate::fixture::FixtureGenerator;
use crate::generator::TextGenerator;

const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Which [`TextGenerator`] implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Fixture,
}

impl LlmProvider {
    pub fn from_str_env(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "fixture" => Some(Self::Fixture),
            _ => None,
        }
    }
}

/// Generation client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// `None` makes every OpenAI call fail with [`GenerationError::MissingApiKey`].
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 90,
            connect_timeout_secs: 10,
        }
    }
}

impl LlmConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env var                    | Default                      |
    /// |----------------------------|------------------------------|
    /// | `LLM_PROVIDER`             | `openai` (or `fixture`)      |
    /// | `OPENAI_API_KEY`           | unset                        |
    /// | `OPENAI_MODEL`             | `gpt-4`                      |
    /// | `OPENAI_BASE_URL`          | `https://api.openai.com/v1`  |
    /// | `LLM_TIMEOUT_SECS`         | `90`                         |
    /// | `LLM_CONNECT_TIMEOUT_SECS` | `10`                         |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let provider = std::env::var("LLM_PROVIDER")
            .ok()
            .map(|raw| {
                LlmProvider::from_str_env(&raw).expect("LLM_PROVIDER must be 'openai' or 'fixture'")
            })
            .unwrap_or(defaults.provider);

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let model = std::env::var("OPENAI_MODEL").unwrap_or(defaults.model);

        let base_url = std::env::var("OPENAI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.timeout_secs.to_string())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        let connect_timeout_secs: u64 = std::env::var("LLM_CONNECT_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.connect_timeout_secs.to_string())
            .parse()
            .expect("LLM_CONNECT_TIMEOUT_SECS must be a valid u64");

        Self {
            provider,
            api_key,
            model,
            base_url,
            timeout_secs,
            connect_timeout_secs,
        }
    }
}

/// Construct the configured generator.
pub fn build_generator(config: &LlmConfig) -> Result<Arc<dyn TextGenerator>, GenerationError> {
    match config.provider {
        LlmProvider::Fixture => Ok(Arc::new(FixtureGenerator::new())),
        LlmProvider::OpenAi => {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
                .build()?;
            Ok(Arc::new(OpenAiClient::with_client(
                client,
                config.base_url.clone(),
                config.api_key.clone(),
                config.model.clone(),
            )))
        }
    }
}
