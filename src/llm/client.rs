//! Provider-agnostic chat client trait

use super::error::BackendError;
use super::types::{LLMRequest, LLMResponse};
use async_trait::async_trait;

/// A chat-completion backend the agent can talk to
///
/// The agent only ever sees this trait: production code plugs in
/// [`GenAIClient`](super::GenAIClient), tests plug in
/// [`MockLLMClient`](super::MockLLMClient) with scripted responses.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Sends a chat request and returns the model's response
    async fn chat(&self, request: LLMRequest) -> Result<LLMResponse, BackendError>;

    /// Human-readable name of the backend (provider name)
    fn name(&self) -> &str;

    /// Model identifier, when the backend knows one
    fn model_info(&self) -> Option<String> {
        None
    }
}
