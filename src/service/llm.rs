//! Shared LLM client and interaction utilities
//!
//! Provides a common interface for OpenAI API interactions used across services.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

/// Default chat model
pub const DEFAULT_MODEL: &str = openai::GPT_4O_MINI;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Failed to create OpenAI client: {0}")]
    Client(String),

    #[error("Completion request failed: {0}")]
    Request(String),
}

/// A single chat-completion call: system instruction plus one user message
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f64,
    pub max_tokens: u64,
}

/// Anything able to answer a chat-completion request with raw text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError>;
}

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    client: openai::Client,
}

impl LlmClient {
    /// Create a new LLM client with the provided API key
    pub fn new(api_key: &str) -> Result<Self, LlmError> {
        let client = openai::Client::new(api_key).map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, LlmError> {
        let agent = self
            .client
            .agent(request.model)
            .preamble(request.system)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build();

        agent
            .prompt(request.prompt)
            .await
            .map_err(|e| LlmError::Request(e.to_string()))
    }
}
