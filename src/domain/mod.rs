pub mod error;
pub mod example;
pub mod llm_config;
