//! Model factory: the chat model and the embedding model with fixed settings.
//!
//! Both talk to Gemini through its OpenAI-compatible endpoint unless `AERODESK_API_BASE`
//! (or `OPENAI_BASE_URL`) points elsewhere.

use async_openai::config::OpenAIConfig;

use crate::agent::BuildError;
use crate::graph::RetryPolicy;
use crate::llm::ChatOpenAI;
use crate::retrieval::OpenAIEmbedder;

pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.0-flash-001";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Where and how to reach the hosted models.
#[derive(Clone, Debug)]
pub struct ModelSettings {
    pub chat_model: String,
    pub embedding_model: String,
    pub api_base: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_retries: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| std::env::var(k).ok())
        .filter(|v| !v.trim().is_empty())
}

impl ModelSettings {
    /// Defaults overridden by `AERODESK_CHAT_MODEL`, `AERODESK_EMBEDDING_MODEL`,
    /// `AERODESK_API_BASE` / `OPENAI_BASE_URL` and
    /// `AERODESK_API_KEY` / `GEMINI_API_KEY` / `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            chat_model: first_env(&["AERODESK_CHAT_MODEL"]).unwrap_or(defaults.chat_model),
            embedding_model: first_env(&["AERODESK_EMBEDDING_MODEL"])
                .unwrap_or(defaults.embedding_model),
            api_base: first_env(&["AERODESK_API_BASE", "OPENAI_BASE_URL"])
                .unwrap_or(defaults.api_base),
            api_key: first_env(&["AERODESK_API_KEY", "GEMINI_API_KEY", "OPENAI_API_KEY"]),
            ..defaults
        }
    }

    fn openai_config(&self) -> Result<OpenAIConfig, BuildError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(BuildError::NoApiKey)?;
        Ok(OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(self.api_base.trim_end_matches('/')))
    }
}

/// Chat model: `gemini-2.0-flash-001` at temperature 0, retried up to 3 times.
/// Tools are bound by the caller with `with_tools`.
pub fn build_llm(settings: &ModelSettings) -> Result<ChatOpenAI, BuildError> {
    let config = settings.openai_config()?;
    Ok(ChatOpenAI::with_config(config, settings.chat_model.clone())
        .with_temperature(settings.temperature)
        .with_retry_policy(RetryPolicy::model_backoff(settings.max_retries)))
}

/// Embedding model: `text-embedding-004`.
pub fn build_embedding_model(settings: &ModelSettings) -> Result<OpenAIEmbedder, BuildError> {
    let config = settings.openai_config()?;
    Ok(OpenAIEmbedder::with_config(config, settings.embedding_model.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::Embedder;

    fn with_key() -> ModelSettings {
        ModelSettings {
            api_key: Some("k".into()),
            ..Default::default()
        }
    }

    #[test]
    fn build_llm_uses_fixed_configuration() {
        let llm = build_llm(&with_key()).unwrap();
        assert_eq!(llm.model(), "gemini-2.0-flash-001");
        assert_eq!(llm.temperature(), Some(0.0));
        assert_eq!(llm.retry_policy().max_attempts(), 3);
    }

    #[test]
    fn build_embedding_model_uses_text_embedding_004() {
        let embedder = build_embedding_model(&with_key()).unwrap();
        assert_eq!(embedder.model(), "text-embedding-004");
        assert_eq!(embedder.dimension(), 768);
    }

    #[test]
    fn missing_api_key_is_an_error() {
        assert!(matches!(
            build_llm(&ModelSettings::default()),
            Err(BuildError::NoApiKey)
        ));
        assert!(matches!(
            build_embedding_model(&ModelSettings::default()),
            Err(BuildError::NoApiKey)
        ));
    }
}
