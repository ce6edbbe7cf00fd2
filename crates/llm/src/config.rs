use std::sync::Arc;
use std::time::Duration;

use itinera_common::{ItineraError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::LlmClient;
use crate::openai::OpenAiClient;

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type: "openai" or "ollama" (any OpenAI-compatible local server)
    #[serde(default = "default_provider", alias = "provider_type")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_provider() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_ms() -> u64 {
    300_000
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            api_url: None,
            temperature: default_temperature(),
            max_tokens: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl LlmConfig {
    /// Name of the environment variable holding this provider's key, if any.
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self.provider.as_str() {
            "openai" => Some("OPENAI_API_KEY"),
            _ => None,
        }
    }

    /// Whether the provider refuses to run without a credential.
    pub fn requires_api_key(&self) -> bool {
        self.provider == "openai"
    }

    /// True when a non-empty key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Build the model client described by `config`.
///
/// Fails with a configuration error when the provider needs a credential and
/// none is configured, so callers can stop before any work starts.
pub fn build_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let client = match config.provider.as_str() {
        "openai" => {
            if !config.has_api_key() {
                return Err(ItineraError::Config(
                    "OpenAI requires an API key (set OPENAI_API_KEY)".to_string(),
                ));
            }
            OpenAiClient::new(
                config.api_url.clone(),
                config.model.clone(),
                config.api_key.clone(),
            )
        }
        "ollama" => OpenAiClient::new(
            Some(
                config
                    .api_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ),
            config.model.clone(),
            config.api_key.clone(),
        ),
        other => {
            return Err(ItineraError::Config(format!(
                "Unknown LLM provider: {other}"
            )));
        }
    };

    let client = client.with_timeout(Duration::from_millis(config.timeout_ms))?;

    info!(
        provider = %config.provider,
        model = %config.model,
        "Language model client initialized"
    );

    Ok(Arc::new(client))
}
