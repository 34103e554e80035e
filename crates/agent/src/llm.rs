use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use haggle_core::config::{LlmConfig, LlmProvider};
use thiserror::Error;

use crate::gemini::GeminiClient;

/// Why a classifier call produced no usable reply.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("classifier is disabled")]
    Disabled,
    #[error("classifier transport failure: {0}")]
    Transport(String),
    #[error("classifier call timed out")]
    Timeout,
    #[error("classifier returned status {0}")]
    Status(u16),
    #[error("classifier returned a malformed body: {0}")]
    MalformedBody(String),
    #[error("classifier returned an empty reply")]
    EmptyReply,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends `prompt`, followed by `context` as a second text part when present.
    async fn complete(&self, prompt: &str, context: Option<&str>) -> Result<String, ClassifierError>;

    fn provider_name(&self) -> &'static str;
}

/// Client for the `offline` provider. Every call fails with [`ClassifierError::Disabled`].
#[derive(Clone, Debug, Default)]
pub struct OfflineClient;

#[async_trait]
impl LlmClient for OfflineClient {
    async fn complete(&self, _prompt: &str, _context: Option<&str>) -> Result<String, ClassifierError> {
        Err(ClassifierError::Disabled)
    }

    fn provider_name(&self) -> &'static str {
        "offline"
    }
}

#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("llm.api_key is required for the gemini provider")]
    MissingApiKey,
    #[error("could not build http client: {0}")]
    Http(#[from] reqwest::Error),
}

pub fn client_from_config(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, ClientInitError> {
    match config.provider {
        LlmProvider::Gemini => {
            let api_key = config.api_key.clone().ok_or(ClientInitError::MissingApiKey)?;
            let client = GeminiClient::new(
                &config.base_url,
                &config.model,
                api_key,
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(client))
        }
        LlmProvider::Offline => Ok(Arc::new(OfflineClient)),
    }
}

#[cfg(test)]
mod tests {
    use haggle_core::config::{AppConfig, LlmProvider};

    use super::{client_from_config, ClassifierError, ClientInitError, LlmClient, OfflineClient};

    #[tokio::test]
    async fn offline_client_is_always_disabled() {
        let result = OfflineClient.complete("anything", Some("[]")).await;
        assert_eq!(result, Err(ClassifierError::Disabled));
    }

    #[test]
    fn gemini_provider_requires_an_api_key() {
        let config = AppConfig::default();
        assert_eq!(config.llm.provider, LlmProvider::Gemini);

        let result = client_from_config(&config.llm);
        assert!(matches!(result, Err(ClientInitError::MissingApiKey)));
    }

    #[test]
    fn provider_selects_the_client() {
        let mut config = AppConfig::default();
        config.llm.provider = LlmProvider::Offline;
        let offline = client_from_config(&config.llm).expect("offline client");
        assert_eq!(offline.provider_name(), "offline");

        config.llm.provider = LlmProvider::Gemini;
        config.llm.api_key = Some("gk-test".to_string().into());
        let gemini = client_from_config(&config.llm).expect("gemini client");
        assert_eq!(gemini.provider_name(), "gemini");
    }
}
