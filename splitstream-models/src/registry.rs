//! Model registry lookups.
//!
//! The registry answers "what models does this provider actually have
//! right now": an external, possibly remote lookup the orchestrator
//! awaits before giving up on a requested model name.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::BackendError;

/// One available model as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name.
    pub name: String,
    /// Provider identifier.
    pub provider: String,
    /// Completion ceiling the model declares for itself, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u64>,
}

impl ModelInfo {
    /// Create a model entry.
    #[must_use]
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            max_completion_tokens: None,
        }
    }

    /// Set the model's self-declared completion ceiling.
    #[must_use]
    pub fn with_max_completion_tokens(mut self, tokens: u64) -> Self {
        self.max_completion_tokens = Some(tokens);
        self
    }
}

/// Source of available-model lists, keyed by provider.
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// List the models a provider currently offers.
    ///
    /// An unknown provider yields an empty list, not an error; network
    /// or auth failures are errors.
    async fn list_models(&self, provider: &str) -> Result<Vec<ModelInfo>, BackendError>;
}

/// Shared handle to a registry.
pub type BoxedRegistry = Arc<dyn ModelRegistry>;

/// In-memory registry populated at construction time.
///
/// Used by tests and by embedders whose model lists are static
/// configuration rather than a remote call.
#[derive(Debug, Default)]
pub struct StaticModelRegistry {
    models: RwLock<HashMap<String, Vec<ModelInfo>>>,
}

impl StaticModelRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under its provider.
    pub fn register(&self, model: ModelInfo) {
        let mut models = self.models.write();
        models.entry(model.provider.clone()).or_default().push(model);
    }

    /// Register a model, builder-style.
    #[must_use]
    pub fn with_model(self, model: ModelInfo) -> Self {
        self.register(model);
        self
    }

    /// Number of registered providers.
    #[must_use]
    pub fn provider_count(&self) -> usize {
        self.models.read().len()
    }
}

#[async_trait]
impl ModelRegistry for StaticModelRegistry {
    async fn list_models(&self, provider: &str) -> Result<Vec<ModelInfo>, BackendError> {
        Ok(self.models.read().get(provider).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_registry_lists_by_provider() {
        let registry = StaticModelRegistry::new()
            .with_model(ModelInfo::new("gpt-4o", "OpenAI"))
            .with_model(ModelInfo::new("gpt-4o-mini", "OpenAI"))
            .with_model(ModelInfo::new("claude-3-haiku-20240307", "Anthropic"));

        let openai = registry.list_models("OpenAI").await.unwrap();
        assert_eq!(openai.len(), 2);
        assert_eq!(openai[0].name, "gpt-4o");

        let unknown = registry.list_models("NoSuchProvider").await.unwrap();
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_model_info_builder() {
        let info = ModelInfo::new("o1-mini", "OpenAI").with_max_completion_tokens(65_536);
        assert_eq!(info.max_completion_tokens, Some(65_536));
    }
}
