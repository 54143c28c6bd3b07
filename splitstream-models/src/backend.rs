//! The completion backend trait.
//!
//! The orchestrator knows nothing about wire protocols or provider SDKs;
//! it only requires something that accepts a system prompt, a message
//! list and a token budget, and hands back a [`StreamingResult`].

use async_trait::async_trait;
use splitstream_core::{GenerationSettings, Message};
use splitstream_streaming::StreamingResult;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::BackendError;

/// How the completion budget is named on the wire.
///
/// Standard chat models take `max_tokens`; reasoning-class models take
/// `max_completion_tokens` instead and reject the former. The
/// orchestrator picks the variant; backends translate it to their
/// provider's parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenBudget {
    /// Standard `max_tokens` parameter.
    MaxTokens(u64),
    /// Reasoning-model `max_completion_tokens` parameter.
    MaxCompletionTokens(u64),
}

impl TokenBudget {
    /// The budget value, regardless of parameter name.
    #[must_use]
    pub fn value(&self) -> u64 {
        match self {
            Self::MaxTokens(v) | Self::MaxCompletionTokens(v) => *v,
        }
    }
}

/// One completion sub-request as the backend sees it.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Full (possibly contextual) system prompt.
    pub system_prompt: String,
    /// Conversation messages for this request.
    pub messages: Vec<Message>,
    /// Completion-token budget and its wire parameter name.
    pub token_budget: TokenBudget,
    /// Sampling/decoding controls.
    pub settings: GenerationSettings,
    /// Caller cancellation signal, if any. Backends should abort the
    /// in-flight call when it fires.
    pub cancellation: Option<CancellationToken>,
}

impl CompletionRequest {
    /// Create a request with default settings.
    #[must_use]
    pub fn new(
        system_prompt: impl Into<String>,
        messages: Vec<Message>,
        token_budget: TokenBudget,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
            token_budget,
            settings: GenerationSettings::default(),
            cancellation: None,
        }
    }

    /// Set the generation settings.
    #[must_use]
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// A provider of streamed completions.
///
/// Implementations wrap an LLM provider call; the pipeline treats them
/// as an external capability.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Model name this backend submits to.
    fn name(&self) -> &str;

    /// Provider identifier (e.g. "OpenAI", "Anthropic").
    fn provider(&self) -> &str;

    /// Submit one completion request.
    ///
    /// The returned result streams text incrementally and resolves to
    /// full text, finish reason and usage counts.
    async fn submit(&self, request: &CompletionRequest) -> Result<StreamingResult, BackendError>;
}

/// Shared handle to a backend.
pub type BoxedBackend = Arc<dyn CompletionBackend>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_budget_value() {
        assert_eq!(TokenBudget::MaxTokens(8_192).value(), 8_192);
        assert_eq!(TokenBudget::MaxCompletionTokens(32_768).value(), 32_768);
    }

    #[test]
    fn test_request_builder() {
        let token = CancellationToken::new();
        let request = CompletionRequest::new(
            "You are helpful.",
            vec![Message::user("hi")],
            TokenBudget::MaxTokens(1_000),
        )
        .with_settings(GenerationSettings::new().temperature(0.3))
        .with_cancellation(token);

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.settings.temperature, Some(0.3));
        assert!(request.cancellation.is_some());
    }
}
