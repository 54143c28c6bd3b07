//! Request shaping and chunk-aware streaming.
//!
//! [`StreamOrchestrator`] sits between callers and a
//! [`CompletionBackend`]: it resolves which model to use, clamps the
//! completion budget to what that model allows, and reshapes parameters
//! for reasoning-class models. When the conversation does not fit a
//! single request, it runs a sequential chunk loop whose partial
//! results are merged into one response.

use splitstream_core::{
    estimate_messages, estimate_text, generate_chunk_id, generate_request_id, GenerationSettings,
    Message, Role, TokenUsage,
};
use splitstream_models::{
    is_reasoning_model, BoxedBackend, BoxedRegistry, CompletionRequest, LimitsCatalog, ModelInfo,
    TokenBudget,
};
use splitstream_streaming::StreamingResult;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::chunker::{chunk_messages, Chunk};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::sanitize::{extract_model_hint, sanitize_message};
use crate::summary::{merge_results, summarize_results};

/// Model used when neither the request nor its messages name one.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Provider used when neither the request nor its messages name one.
pub const DEFAULT_PROVIDER: &str = "Anthropic";

/// A caller-facing streaming request, before shaping.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    /// Conversation to complete.
    pub messages: Vec<Message>,
    /// Base system prompt; the orchestrator may append chunk context.
    pub system_prompt: String,
    /// Explicit model choice; overrides in-message annotations.
    pub model: Option<String>,
    /// Explicit provider choice; overrides in-message annotations.
    pub provider: Option<String>,
    /// Requested completion budget; clamped to the model's ceiling.
    pub max_tokens: Option<u64>,
    /// Sampling/decoding controls.
    pub settings: GenerationSettings,
    /// Cooperative cancellation signal.
    pub cancellation: Option<CancellationToken>,
}

impl StreamRequest {
    /// Create a request for a conversation with an empty system prompt.
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            system_prompt: String::new(),
            model: None,
            provider: None,
            max_tokens: None,
            settings: GenerationSettings::default(),
            cancellation: None,
        }
    }

    /// Set the base system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Name the model explicitly.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Name the provider explicitly.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Request a completion-token budget.
    #[must_use]
    pub fn with_max_tokens(mut self, tokens: u64) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set the generation settings.
    #[must_use]
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Attach a cancellation token, checked before every chunk and
    /// propagated into each backend call.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Builder for [`StreamOrchestrator`].
#[derive(Default)]
pub struct StreamOrchestratorBuilder {
    backend: Option<BoxedBackend>,
    registry: Option<BoxedRegistry>,
    catalog: Option<LimitsCatalog>,
    default_model: Option<String>,
    default_provider: Option<String>,
}

impl StreamOrchestratorBuilder {
    /// Set the completion backend.
    #[must_use]
    pub fn backend(mut self, backend: BoxedBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the model registry.
    #[must_use]
    pub fn registry(mut self, registry: BoxedRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the built-in limits catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: LimitsCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Override the fallback model name.
    #[must_use]
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Override the fallback provider name.
    #[must_use]
    pub fn default_provider(mut self, provider: impl Into<String>) -> Self {
        self.default_provider = Some(provider.into());
        self
    }

    /// Build the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Configuration`] if no backend or no
    /// registry was provided.
    pub fn build(self) -> OrchestratorResult<StreamOrchestrator> {
        let backend = self
            .backend
            .ok_or_else(|| OrchestratorError::Configuration("no backend configured".into()))?;
        let registry = self
            .registry
            .ok_or_else(|| OrchestratorError::Configuration("no model registry configured".into()))?;

        Ok(StreamOrchestrator {
            backend,
            registry,
            catalog: self.catalog.unwrap_or_default(),
            default_model: self.default_model.unwrap_or_else(|| DEFAULT_MODEL.into()),
            default_provider: self
                .default_provider
                .unwrap_or_else(|| DEFAULT_PROVIDER.into()),
        })
    }
}

/// Shapes completion requests and streams their results.
pub struct StreamOrchestrator {
    backend: BoxedBackend,
    registry: BoxedRegistry,
    catalog: LimitsCatalog,
    default_model: String,
    default_provider: String,
}

impl StreamOrchestrator {
    /// Start building an orchestrator.
    #[must_use]
    pub fn builder() -> StreamOrchestratorBuilder {
        StreamOrchestratorBuilder::default()
    }

    /// Stream a completion for the request.
    ///
    /// A conversation that fits the budget goes to the backend as a
    /// single request and the backend's own stream is returned
    /// untouched. An oversized conversation is chunked: each chunk is
    /// submitted sequentially with a contextual system prompt, failed
    /// chunks become inline error markers rather than failing the whole
    /// call, and the merged text comes back as a synthesized stream.
    ///
    /// # Errors
    ///
    /// [`OrchestratorError::Configuration`] when the resolved provider
    /// has no models, [`OrchestratorError::Backend`] when the
    /// single-shot submit fails, and [`OrchestratorError::Cancelled`]
    /// when the cancellation token fires between chunks.
    pub async fn stream_text(&self, request: StreamRequest) -> OrchestratorResult<StreamingResult> {
        let request_id = generate_request_id();
        info!(
            %request_id,
            messages = request.messages.len(),
            "shaping stream request"
        );

        let (messages, hinted_model, hinted_provider) = Self::preprocess(&request.messages);

        let provider = request
            .provider
            .clone()
            .or(hinted_provider)
            .unwrap_or_else(|| self.default_provider.clone());
        let model_name = request
            .model
            .clone()
            .or(hinted_model)
            .unwrap_or_else(|| self.default_model.clone());

        let details = self.resolve_model(&model_name, &provider).await?;
        let safe_max_tokens = self.resolve_budget(&request, &details, &provider);

        let reasoning = is_reasoning_model(&details.name);
        let settings = if reasoning {
            // Reasoning models reject sampling controls and any
            // temperature other than 1.
            request.settings.without_sampling_controls().temperature(1.0)
        } else {
            request.settings.clone()
        };
        let budget = if reasoning {
            TokenBudget::MaxCompletionTokens(safe_max_tokens)
        } else {
            TokenBudget::MaxTokens(safe_max_tokens)
        };

        if reasoning {
            debug!(model = %details.name, "reasoning model: renamed budget parameter, fixed temperature");
        }

        let system_prompt_tokens = (request.system_prompt.len() as u64).div_ceil(4);
        let chunks = chunk_messages(&messages, safe_max_tokens, system_prompt_tokens);

        if chunks.len() == 1 && !chunks[0].is_partial {
            let mut completion =
                CompletionRequest::new(request.system_prompt.clone(), messages, budget)
                    .with_settings(settings);
            if let Some(token) = &request.cancellation {
                completion = completion.with_cancellation(token.clone());
            }
            return Ok(self.backend.submit(&completion).await?);
        }

        info!(
            %request_id,
            chunk_count = chunks.len(),
            budget = safe_max_tokens,
            "conversation exceeds budget; streaming in chunks"
        );

        self.stream_chunked(&request, &chunks, budget, &settings, system_prompt_tokens)
            .await
    }

    /// Collect `[Model: ...]` / `[Provider: ...]` annotations from user
    /// messages and scrub reasoning wrappers out of user and assistant
    /// text; later annotations override earlier ones.
    fn preprocess(messages: &[Message]) -> (Vec<Message>, Option<String>, Option<String>) {
        let mut model = None;
        let mut provider = None;
        let mut processed = Vec::with_capacity(messages.len());

        for message in messages {
            match message.role {
                Role::User => {
                    let (hint, cleaned) = extract_model_hint(message);
                    if hint.model.is_some() {
                        model = hint.model;
                    }
                    if hint.provider.is_some() {
                        provider = hint.provider;
                    }
                    processed.push(sanitize_message(&cleaned));
                }
                Role::Assistant => processed.push(sanitize_message(message)),
                Role::System => processed.push(message.clone()),
            }
        }

        (processed, model, provider)
    }

    /// Look the model up in the registry.
    ///
    /// An empty model list is fatal; an unknown model name soft-falls
    /// back to the provider's first model.
    async fn resolve_model(
        &self,
        model_name: &str,
        provider: &str,
    ) -> OrchestratorResult<ModelInfo> {
        let models = self.registry.list_models(provider).await?;
        if models.is_empty() {
            return Err(OrchestratorError::Configuration(format!(
                "no models found for provider {provider}"
            )));
        }

        match models.iter().find(|m| m.name == model_name) {
            Some(found) => Ok(found.clone()),
            None => {
                let fallback = models[0].clone();
                warn!(
                    requested = %model_name,
                    fallback = %fallback.name,
                    "model not found for provider; using its first model"
                );
                Ok(fallback)
            }
        }
    }

    /// Clamp the completion budget to every ceiling that applies: the
    /// catalog's, the registry entry's own, and the caller's request.
    fn resolve_budget(&self, request: &StreamRequest, details: &ModelInfo, provider: &str) -> u64 {
        let resolved = self.catalog.lookup(&details.name, provider);
        let mut safe = resolved.max_completion_tokens;

        if let Some(own) = details.max_completion_tokens {
            safe = safe.min(own);
        }

        if let Some(requested) = request.max_tokens {
            let validation = self.catalog.validate(&details.name, provider, requested);
            if !validation.valid {
                warn!(
                    requested,
                    limit = validation.actual_limit,
                    model = %details.name,
                    "requested budget exceeds model ceiling; clamping"
                );
            }
            safe = safe.min(requested.min(validation.actual_limit));
        }

        safe
    }

    /// The sequential chunk loop.
    async fn stream_chunked(
        &self,
        request: &StreamRequest,
        chunks: &[Chunk],
        budget: TokenBudget,
        settings: &GenerationSettings,
        system_prompt_tokens: u64,
    ) -> OrchestratorResult<StreamingResult> {
        let mut results: Vec<String> = Vec::with_capacity(chunks.len());
        let mut prompt_tokens = system_prompt_tokens;

        for chunk in chunks {
            if let Some(token) = &request.cancellation {
                if token.is_cancelled() {
                    return Err(OrchestratorError::Cancelled);
                }
            }

            let prompt = Self::contextual_prompt(&request.system_prompt, chunk, &results);
            prompt_tokens += estimate_messages(&chunk.messages);

            let mut completion =
                CompletionRequest::new(prompt, chunk.messages.clone(), budget)
                    .with_settings(settings.clone());
            if let Some(token) = &request.cancellation {
                completion = completion.with_cancellation(token.clone());
            }

            let chunk_id = generate_chunk_id();
            let part = chunk.chunk_index + 1;
            debug!(%chunk_id, part, total = chunk.total_chunks, "submitting chunk");

            let text = match self.backend.submit(&completion).await {
                Ok(streaming) => match streaming.collect().await {
                    Ok(collected) => collected.text,
                    Err(error) => {
                        warn!(part, %error, "chunk stream failed; keeping inline marker");
                        format!("[Error in part {part}: {error}]")
                    }
                },
                Err(error) => {
                    warn!(part, %error, "chunk submit failed; keeping inline marker");
                    format!("[Error in part {part}: {error}]")
                }
            };
            results.push(text);
        }

        let merged = merge_results(&results);
        let usage = TokenUsage::with_tokens(prompt_tokens, estimate_text(&merged));
        Ok(StreamingResult::from_text(merged, usage))
    }

    /// System prompt for one chunk: the base prompt, a digest of prior
    /// results after the first chunk, and a part marker when partial.
    fn contextual_prompt(base: &str, chunk: &Chunk, prior_results: &[String]) -> String {
        let mut prompt = base.to_string();

        if chunk.chunk_index > 0 && !prior_results.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&summarize_results(prior_results));
        }

        if chunk.is_partial {
            prompt.push_str(&format!(
                "\n\nNote: this is part {} of {} of the full request. \
                 Answer the portion covered by these messages.",
                chunk.chunk_index + 1,
                chunk.total_chunks
            ));
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitstream_core::{ContentPart, FinishReason, MessageContent};
    use splitstream_models::{
        BackendError, MockBackend, ModelLimits, StaticModelRegistry,
    };
    use std::sync::Arc;

    fn words(count: usize) -> Message {
        Message::user("word ".repeat(count).trim_end().to_string())
    }

    /// Catalog and registry for a 300-token model, small enough to
    /// force chunking with modest conversations.
    fn tiny_setup() -> (LimitsCatalog, Arc<StaticModelRegistry>) {
        let catalog = LimitsCatalog::empty().with_model(ModelLimits::new(
            "tiny-chat",
            "TestLab",
            4_000,
            300,
            "2025-01-01",
        ));
        let registry = Arc::new(
            StaticModelRegistry::new().with_model(ModelInfo::new("tiny-chat", "TestLab")),
        );
        (catalog, registry)
    }

    fn orchestrator_with(
        backend: Arc<MockBackend>,
        catalog: LimitsCatalog,
        registry: Arc<StaticModelRegistry>,
    ) -> StreamOrchestrator {
        StreamOrchestrator::builder()
            .backend(backend)
            .registry(registry)
            .catalog(catalog)
            .default_model("tiny-chat")
            .default_provider("TestLab")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_single_shot_passes_through() {
        let backend = Arc::new(MockBackend::new("tiny-chat", "TestLab").with_text("hello back"));
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend.clone(), catalog, registry);

        let result = orchestrator
            .stream_text(
                StreamRequest::new(vec![Message::user("hi")])
                    .with_system_prompt("Be brief."),
            )
            .await
            .unwrap();
        let collected = result.collect().await.unwrap();

        assert_eq!(collected.text, "hello back");
        assert_eq!(collected.finish_reason, FinishReason::Stop);
        assert_eq!(backend.call_count(), 1);

        let recorded = backend.recorded_requests();
        assert_eq!(recorded[0].system_prompt, "Be brief.");
        assert_eq!(recorded[0].token_budget, TokenBudget::MaxTokens(300));
    }

    #[tokio::test]
    async fn test_single_shot_backend_error_propagates() {
        let backend = Arc::new(
            MockBackend::new("tiny-chat", "TestLab")
                .with_submit_error(BackendError::api("overloaded")),
        );
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend, catalog, registry);

        let error = orchestrator
            .stream_text(StreamRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(error, OrchestratorError::Backend(_)));
    }

    #[tokio::test]
    async fn test_chunked_path_merges_parts_in_order() {
        let backend = Arc::new(
            MockBackend::new("tiny-chat", "TestLab")
                .with_text("alpha")
                .with_text("beta")
                .with_text("gamma"),
        );
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend.clone(), catalog, registry);

        // Three 150-word messages are ~245 tokens each; only one fits
        // per 300-token chunk.
        let request = StreamRequest::new(vec![words(150), words(150), words(150)])
            .with_system_prompt("Be brief.");
        let collected = orchestrator
            .stream_text(request)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();

        assert_eq!(
            collected.text,
            "alpha\n\n--- Part 2 ---\n\nbeta\n\n--- Part 3 ---\n\ngamma"
        );
        assert!(collected.usage.prompt_tokens > 0);
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_chunked_prompts_carry_digest_and_part_marker() {
        let backend = Arc::new(
            MockBackend::new("tiny-chat", "TestLab")
                .with_text("alpha")
                .with_text("beta")
                .with_text("gamma"),
        );
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend.clone(), catalog, registry);

        let request = StreamRequest::new(vec![words(150), words(150), words(150)])
            .with_system_prompt("Be brief.");
        orchestrator.stream_text(request).await.unwrap();

        let recorded = backend.recorded_requests();
        assert_eq!(recorded.len(), 3);

        // First chunk: base prompt and marker, no digest yet.
        assert!(recorded[0].system_prompt.starts_with("Be brief."));
        assert!(!recorded[0].system_prompt.contains("Summary of previous parts"));
        assert!(recorded[0].system_prompt.contains("part 1 of 3"));

        // Second chunk sees the first result.
        assert!(recorded[1].system_prompt.contains("Summary of previous parts"));
        assert!(recorded[1].system_prompt.contains("1. alpha..."));
        assert!(recorded[1].system_prompt.contains("part 2 of 3"));

        // Third chunk sees both prior results.
        assert!(recorded[2].system_prompt.contains("2. beta..."));
    }

    #[tokio::test]
    async fn test_chunk_failure_becomes_inline_marker() {
        let backend = Arc::new(
            MockBackend::new("tiny-chat", "TestLab")
                .with_text("alpha")
                .with_submit_error(BackendError::api("overloaded"))
                .with_text("gamma"),
        );
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend.clone(), catalog, registry);

        let request = StreamRequest::new(vec![words(150), words(150), words(150)]);
        let collected = orchestrator
            .stream_text(request)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();

        assert!(collected.text.starts_with("alpha"));
        assert!(collected.text.contains("[Error in part 2:"));
        assert!(collected.text.ends_with("gamma"));
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_becomes_inline_marker() {
        let backend = Arc::new(
            MockBackend::new("tiny-chat", "TestLab")
                .with_text("alpha")
                .with_stream_error("partial ", "connection reset")
                .with_text("gamma"),
        );
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend, catalog, registry);

        let request = StreamRequest::new(vec![words(150), words(150), words(150)]);
        let collected = orchestrator
            .stream_text(request)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();

        assert!(collected.text.contains("[Error in part 2:"));
        assert!(collected.text.ends_with("gamma"));
    }

    #[tokio::test]
    async fn test_budget_clamped_to_catalog_ceiling() {
        let backend = Arc::new(MockBackend::new("claude-3-5-sonnet-20241022", "Anthropic"));
        let registry = Arc::new(StaticModelRegistry::new().with_model(ModelInfo::new(
            "claude-3-5-sonnet-20241022",
            "Anthropic",
        )));
        let orchestrator = StreamOrchestrator::builder()
            .backend(backend.clone())
            .registry(registry)
            .build()
            .unwrap();

        let request =
            StreamRequest::new(vec![Message::user("hi")]).with_max_tokens(500_000);
        orchestrator.stream_text(request).await.unwrap();

        let recorded = backend.recorded_requests();
        assert_eq!(recorded[0].token_budget, TokenBudget::MaxTokens(8_192));
    }

    #[tokio::test]
    async fn test_registry_ceiling_caps_budget() {
        let backend = Arc::new(MockBackend::new("tiny-chat", "TestLab"));
        let catalog = LimitsCatalog::empty().with_model(ModelLimits::new(
            "tiny-chat",
            "TestLab",
            4_000,
            300,
            "2025-01-01",
        ));
        let registry = Arc::new(StaticModelRegistry::new().with_model(
            ModelInfo::new("tiny-chat", "TestLab").with_max_completion_tokens(128),
        ));
        let orchestrator = orchestrator_with(backend.clone(), catalog, registry);

        orchestrator
            .stream_text(StreamRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap();

        let recorded = backend.recorded_requests();
        assert_eq!(recorded[0].token_budget, TokenBudget::MaxTokens(128));
    }

    #[tokio::test]
    async fn test_reasoning_model_shaping() {
        let backend = Arc::new(MockBackend::new("o1-mini", "OpenAI"));
        let registry = Arc::new(
            StaticModelRegistry::new().with_model(ModelInfo::new("o1-mini", "OpenAI")),
        );
        let orchestrator = StreamOrchestrator::builder()
            .backend(backend.clone())
            .registry(registry)
            .default_model("o1-mini")
            .default_provider("OpenAI")
            .build()
            .unwrap();

        let request = StreamRequest::new(vec![Message::user("hi")]).with_settings(
            GenerationSettings::new()
                .temperature(0.2)
                .top_p(0.9)
                .frequency_penalty(0.5),
        );
        orchestrator.stream_text(request).await.unwrap();

        let recorded = backend.recorded_requests();
        assert!(matches!(
            recorded[0].token_budget,
            TokenBudget::MaxCompletionTokens(_)
        ));
        assert_eq!(recorded[0].settings.temperature, Some(1.0));
        assert_eq!(recorded[0].settings.top_p, None);
        assert_eq!(recorded[0].settings.frequency_penalty, None);
    }

    #[tokio::test]
    async fn test_empty_provider_is_fatal() {
        let backend = Arc::new(MockBackend::new("tiny-chat", "TestLab"));
        let registry = Arc::new(StaticModelRegistry::new());
        let orchestrator = StreamOrchestrator::builder()
            .backend(backend.clone())
            .registry(registry)
            .build()
            .unwrap();

        let error = orchestrator
            .stream_text(StreamRequest::new(vec![Message::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(error, OrchestratorError::Configuration(_)));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_model_falls_back_to_first() {
        let backend = Arc::new(MockBackend::new("tiny-chat", "TestLab"));
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend.clone(), catalog, registry);

        let request = StreamRequest::new(vec![Message::user("hi")])
            .with_model("gpt-nonexistent")
            .with_provider("TestLab");
        orchestrator.stream_text(request).await.unwrap();

        // Falls back to tiny-chat's limits rather than failing.
        let recorded = backend.recorded_requests();
        assert_eq!(recorded[0].token_budget, TokenBudget::MaxTokens(300));
    }

    #[tokio::test]
    async fn test_cancellation_between_chunks() {
        let backend = Arc::new(MockBackend::new("tiny-chat", "TestLab"));
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend.clone(), catalog, registry);

        let token = CancellationToken::new();
        token.cancel();

        let request = StreamRequest::new(vec![words(150), words(150), words(150)])
            .with_cancellation(token);
        let error = orchestrator.stream_text(request).await.unwrap_err();

        assert!(matches!(error, OrchestratorError::Cancelled));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_hint_extracted_from_message() {
        let backend = Arc::new(MockBackend::new("tiny-chat", "TestLab"));
        let (catalog, registry) = tiny_setup();
        let orchestrator = StreamOrchestrator::builder()
            .backend(backend.clone())
            .registry(registry)
            .catalog(catalog)
            .default_model("some-other-model")
            .default_provider("Nowhere")
            .build()
            .unwrap();

        let request = StreamRequest::new(vec![Message::user(
            "[Model: tiny-chat]\n\n[Provider: TestLab]\n\nhello there",
        )]);
        orchestrator.stream_text(request).await.unwrap();

        let recorded = backend.recorded_requests();
        assert_eq!(recorded[0].messages[0].text(), "hello there");
        assert_eq!(recorded[0].token_budget, TokenBudget::MaxTokens(300));
    }

    #[tokio::test]
    async fn test_user_reasoning_stripped_before_submit() {
        let backend = Arc::new(MockBackend::new("tiny-chat", "TestLab"));
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend.clone(), catalog, registry);

        let request = StreamRequest::new(vec![Message::user(
            "<think>internal</think>what is two plus two?",
        )]);
        orchestrator.stream_text(request).await.unwrap();

        let recorded = backend.recorded_requests();
        assert_eq!(recorded[0].messages[0].text(), "what is two plus two?");
    }

    #[tokio::test]
    async fn test_multipart_user_message_hint_and_scrub() {
        let backend = Arc::new(MockBackend::new("tiny-chat", "TestLab"));
        let (catalog, registry) = tiny_setup();
        let orchestrator = StreamOrchestrator::builder()
            .backend(backend.clone())
            .registry(registry)
            .catalog(catalog)
            .default_model("some-other-model")
            .default_provider("Nowhere")
            .build()
            .unwrap();

        let request = StreamRequest::new(vec![Message::user(vec![
            ContentPart::text("[Model: tiny-chat]\n\n[Provider: TestLab]\n\n<think>leak</think>describe the image"),
            ContentPart::opaque_bytes("image", vec![0u8; 8]),
        ])]);
        orchestrator.stream_text(request).await.unwrap();

        // Annotations resolved the model, so the call went through.
        let recorded = backend.recorded_requests();
        assert_eq!(recorded[0].token_budget, TokenBudget::MaxTokens(300));

        // Text part cleaned of tags and reasoning, opaque part intact.
        match &recorded[0].messages[0].content {
            MessageContent::Parts(parts) => {
                assert_eq!(parts[0].as_text(), Some("describe the image"));
                assert!(!parts[1].is_text());
            }
            MessageContent::Text(_) => panic!("expected multi-part content"),
        }
    }

    #[tokio::test]
    async fn test_assistant_reasoning_stripped_before_submit() {
        let backend = Arc::new(MockBackend::new("tiny-chat", "TestLab"));
        let (catalog, registry) = tiny_setup();
        let orchestrator = orchestrator_with(backend.clone(), catalog, registry);

        let request = StreamRequest::new(vec![
            Message::user("question"),
            Message::assistant("<think>internal plan</think>visible answer"),
            Message::user("follow-up"),
        ]);
        orchestrator.stream_text(request).await.unwrap();

        let recorded = backend.recorded_requests();
        assert_eq!(recorded[0].messages[1].text(), "visible answer");
    }
}
