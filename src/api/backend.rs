//! Completion client over the `llm` crate's Groq backend.

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;

use super::error::ChainError;
use crate::core::config::{self, Settings};

/// A single chat-completion call: one system plus one user message with the
/// sampling parameters for this step. Built fresh per call, never reused.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

/// The completion text of the first choice.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
}

/// Issues chat completions.
///
/// The chain runner only talks to this trait, so apps inject [`GroqBackend`]
/// and tests inject in-memory stubs.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest)
        -> Result<CompletionResponse, ChainError>;
}

/// Production backend speaking to Groq through the `llm` crate.
///
/// Streaming stays off: every call blocks until the full completion is
/// available, and there is no retry or cancellation.
pub struct GroqBackend {
    api_key: String,
}

impl GroqBackend {
    /// Creates a backend from already-resolved settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
        }
    }

    /// Reads the credential from the environment, failing fast when absent.
    pub fn from_env() -> Result<Self, ChainError> {
        let settings = config::load()?;
        Ok(Self::new(&settings))
    }
}

#[async_trait]
impl CompletionBackend for GroqBackend {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ChainError> {
        let provider = LLMBuilder::new()
            .backend(LLMBackend::Groq)
            .api_key(self.api_key.clone())
            .model(request.model.clone())
            .system(request.system.clone())
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .top_p(request.top_p)
            .stream(false)
            .build()?;

        log::debug!("requesting completion from model '{}'", request.model);
        let messages = vec![ChatMessage::user().content(&request.user).build()];
        let response = provider.chat(&messages).await?;

        let text = response
            .text()
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(ChainError::EmptyResponse);
        }
        Ok(CompletionResponse { text })
    }
}
