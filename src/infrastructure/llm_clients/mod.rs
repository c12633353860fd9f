pub mod ollama;
pub mod openrouter;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::error::Result;
use crate::domain::llm_config::{LLMConfig, LLMProvider};
use ollama::OllamaClient;
use openrouter::OpenRouterClient;

#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Bind a provider for the lifetime of a pipeline instance.
///
/// If the configuration requests OpenRouter but the client cannot be
/// constructed (no API key), fall back to Ollama rather than failing to
/// start. This is the only automatic provider switch; nothing falls back
/// mid-request.
pub fn select_client(config: &LLMConfig) -> Arc<dyn LLMClient> {
    let client: Arc<dyn LLMClient> = match config.provider {
        LLMProvider::OpenRouter => match OpenRouterClient::new(config) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                warn!(error = %err, "OpenRouter unavailable, falling back to Ollama");
                Arc::new(OllamaClient::new(config))
            }
        },
        LLMProvider::Ollama => Arc::new(OllamaClient::new(config)),
    };
    info!(provider = client.name(), "LLM provider bound");
    client
}
