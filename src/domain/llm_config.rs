use serde::{Deserialize, Serialize};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum LLMProvider {
    Ollama,
    OpenRouter,
}

impl LLMProvider {
    /// Resolve a provider from a configuration value. Matching is
    /// case-insensitive; unset or unrecognized values select Ollama.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "openrouter" => LLMProvider::OpenRouter,
            _ => LLMProvider::Ollama,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub ollama_url: String,
    pub ollama_model: String,
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::Ollama,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "gemma:2b".to_string(),
            openrouter_api_key: None,
            openrouter_model: "meta-llama/llama-3.1-8b-instruct:free".to_string(),
            openrouter_base_url: OPENROUTER_BASE_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_name_case_insensitive() {
        assert_eq!(LLMProvider::from_name("OpenRouter"), LLMProvider::OpenRouter);
        assert_eq!(LLMProvider::from_name("OPENROUTER"), LLMProvider::OpenRouter);
        assert_eq!(LLMProvider::from_name("ollama"), LLMProvider::Ollama);
    }

    #[test]
    fn test_provider_from_name_defaults_to_ollama() {
        assert_eq!(LLMProvider::from_name(""), LLMProvider::Ollama);
        assert_eq!(LLMProvider::from_name("gpt4all"), LLMProvider::Ollama);
    }
}
