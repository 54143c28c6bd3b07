//! Model token-limit reference data and resolution.
//!
//! Published token ceilings are inconsistent and often wrong; this
//! catalog records the confirmed values for models we know, falls back
//! to per-provider defaults, and finally to a conservative global
//! default. Lookup is total: it never fails and never returns a
//! non-positive completion ceiling.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Confirmed token limits for a single model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLimits {
    /// Model identifier as the provider names it.
    pub model_name: String,
    /// Provider identifier.
    pub provider: String,
    /// Maximum combined input+output tokens.
    pub max_context_tokens: u64,
    /// Maximum tokens the model may generate per response.
    pub max_completion_tokens: u64,
    /// When the entry was last verified (ISO date).
    pub last_updated: String,
    /// Free-form notes, e.g. discrepancies with published docs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ModelLimits {
    /// Create a limits entry.
    #[must_use]
    pub fn new(
        model_name: impl Into<String>,
        provider: impl Into<String>,
        max_context_tokens: u64,
        max_completion_tokens: u64,
        last_updated: impl Into<String>,
    ) -> Self {
        debug_assert!(max_completion_tokens > 0);
        Self {
            model_name: model_name.into(),
            provider: provider.into(),
            max_context_tokens,
            max_completion_tokens,
            last_updated: last_updated.into(),
            notes: None,
        }
    }

    /// Attach a note.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The ceilings a lookup resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLimits {
    /// Maximum combined input+output tokens.
    pub max_context_tokens: u64,
    /// Maximum completion tokens.
    pub max_completion_tokens: u64,
}

/// Outcome of validating a requested completion budget.
///
/// Invalid requests are not rejected: callers are expected to clamp to
/// `actual_limit` and proceed rather than fail the user over a
/// token-accounting disagreement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValidation {
    /// Whether the requested count fits the resolved ceiling.
    pub valid: bool,
    /// The ceiling to clamp to.
    pub actual_limit: u64,
    /// Explanation when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// How many sub-requests a conversation of a given size needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEstimate {
    /// Number of chunks required.
    pub chunks_needed: u64,
    /// Token budget available per chunk.
    pub tokens_per_chunk: u64,
}

/// Global fallback when even the provider is unknown.
const GLOBAL_DEFAULT: ResolvedLimits = ResolvedLimits {
    max_context_tokens: 32_768,
    max_completion_tokens: 4_096,
};

/// Immutable model-limit lookup table.
///
/// Constructed once at startup and passed to the orchestrator as an
/// explicit collaborator; there is no mutable global state.
#[derive(Debug, Clone)]
pub struct LimitsCatalog {
    models: Vec<ModelLimits>,
    provider_defaults: HashMap<String, ResolvedLimits>,
}

impl LimitsCatalog {
    /// Create an empty catalog (tests and embedders).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            models: Vec::new(),
            provider_defaults: HashMap::new(),
        }
    }

    /// The built-in reference table of known models and provider defaults.
    #[must_use]
    pub fn builtin() -> Self {
        let models = vec![
            // Anthropic Claude
            ModelLimits::new("claude-3-5-sonnet-20241022", "Anthropic", 200_000, 8_192, "2024-12-21")
                .with_notes("confirmed output ceiling; some sources wrongly list 128000"),
            ModelLimits::new("claude-3-haiku-20240307", "Anthropic", 200_000, 4_096, "2024-12-21"),
            ModelLimits::new("claude-3-opus-20240229", "Anthropic", 200_000, 4_096, "2024-12-21"),
            ModelLimits::new("claude-opus-4-20250514", "Anthropic", 200_000, 32_000, "2024-12-21"),
            // OpenAI GPT
            ModelLimits::new("gpt-4o", "OpenAI", 128_000, 16_384, "2024-12-21"),
            ModelLimits::new("gpt-4o-mini", "OpenAI", 128_000, 16_384, "2024-12-21"),
            ModelLimits::new("gpt-4-turbo", "OpenAI", 128_000, 4_096, "2024-12-21"),
            ModelLimits::new("gpt-3.5-turbo", "OpenAI", 16_385, 4_096, "2024-12-21"),
            // Google Gemini
            ModelLimits::new("gemini-1.5-pro", "Google", 2_097_152, 8_192, "2024-12-21"),
            ModelLimits::new("gemini-1.5-flash", "Google", 1_048_576, 8_192, "2024-12-21"),
            ModelLimits::new("gemini-2.0-flash", "Google", 1_048_576, 8_192, "2024-12-21"),
            // Reasoning models
            ModelLimits::new("o1-preview", "OpenAI", 128_000, 32_768, "2024-12-21")
                .with_notes("reasoning model; uses the max_completion_tokens parameter"),
            ModelLimits::new("o1-mini", "OpenAI", 128_000, 65_536, "2024-12-21")
                .with_notes("reasoning model; uses the max_completion_tokens parameter"),
        ];

        let provider_defaults = [
            ("Anthropic", 200_000, 8_192),
            ("OpenAI", 128_000, 4_096),
            ("Google", 1_048_576, 8_192),
            ("Cohere", 128_000, 4_000),
            ("DeepSeek", 128_000, 8_192),
            ("Groq", 32_768, 8_192),
            ("HuggingFace", 32_768, 4_096),
            ("Mistral", 128_000, 8_192),
            ("Ollama", 32_768, 8_192),
            ("OpenRouter", 128_000, 8_192),
            ("Perplexity", 128_000, 8_192),
            ("Together", 128_000, 8_192),
            ("xAI", 128_000, 8_192),
            ("LMStudio", 32_768, 8_192),
            ("OpenAILike", 128_000, 8_192),
            ("AmazonBedrock", 200_000, 8_192),
            ("Hyperbolic", 128_000, 8_192),
        ]
        .into_iter()
        .map(|(provider, ctx, completion)| {
            (
                provider.to_string(),
                ResolvedLimits {
                    max_context_tokens: ctx,
                    max_completion_tokens: completion,
                },
            )
        })
        .collect();

        Self {
            models,
            provider_defaults,
        }
    }

    /// Add a model entry. Entries are appended, so an earlier entry
    /// with the same name keeps winning every lookup; this extends the
    /// table, it does not replace rows.
    #[must_use]
    pub fn with_model(mut self, limits: ModelLimits) -> Self {
        self.models.push(limits);
        self
    }

    /// Add or override a provider default.
    #[must_use]
    pub fn with_provider_default(
        mut self,
        provider: impl Into<String>,
        limits: ResolvedLimits,
    ) -> Self {
        self.provider_defaults.insert(provider.into(), limits);
        self
    }

    /// Find a known entry by exact name, then by case-insensitive
    /// substring match in either direction.
    ///
    /// Fuzzy ties resolve to the first match in table order. This is an
    /// accuracy tradeoff for dated snapshot names, not a best-match
    /// search.
    #[must_use]
    pub fn find(&self, model_name: &str) -> Option<&ModelLimits> {
        if let Some(exact) = self.models.iter().find(|m| m.model_name == model_name) {
            return Some(exact);
        }

        let needle = model_name.to_lowercase();
        self.models.iter().find(|m| {
            let known = m.model_name.to_lowercase();
            needle.contains(&known) || known.contains(&needle)
        })
    }

    /// Resolve the token ceilings for a model.
    ///
    /// Falls back to the provider default, then to the global default.
    /// Never fails; the completion ceiling is always positive.
    #[must_use]
    pub fn lookup(&self, model_name: &str, provider: &str) -> ResolvedLimits {
        if let Some(limits) = self.find(model_name) {
            return ResolvedLimits {
                max_context_tokens: limits.max_context_tokens,
                max_completion_tokens: limits.max_completion_tokens,
            };
        }

        match self.provider_defaults.get(provider) {
            Some(defaults) => {
                debug!(model_name, provider, "model unknown, using provider default limits");
                *defaults
            }
            None => {
                debug!(model_name, provider, "provider unknown, using global default limits");
                GLOBAL_DEFAULT
            }
        }
    }

    /// Validate a requested completion-token count against the resolved
    /// ceiling.
    ///
    /// Fail-open: an over-budget request comes back `valid: false` with
    /// the ceiling to clamp to, never an error the caller must handle.
    #[must_use]
    pub fn validate(
        &self,
        model_name: &str,
        provider: &str,
        requested_tokens: u64,
    ) -> TokenValidation {
        let limits = self.lookup(model_name, provider);

        if requested_tokens <= limits.max_completion_tokens {
            return TokenValidation {
                valid: true,
                actual_limit: limits.max_completion_tokens,
                error: None,
            };
        }

        TokenValidation {
            valid: false,
            actual_limit: limits.max_completion_tokens,
            error: Some(format!(
                "requested {requested_tokens} tokens, but {model_name} allows at most {} completion tokens",
                limits.max_completion_tokens
            )),
        }
    }

    /// Estimate how many chunks a conversation of `total_tokens` needs
    /// for the given model, reserving `system_prompt_tokens` per chunk.
    #[must_use]
    pub fn required_chunks(
        &self,
        total_tokens: u64,
        model_name: &str,
        provider: &str,
        system_prompt_tokens: u64,
    ) -> ChunkEstimate {
        let limits = self.lookup(model_name, provider);
        let available = limits
            .max_completion_tokens
            .saturating_sub(system_prompt_tokens)
            .max(1);

        if total_tokens <= available {
            return ChunkEstimate {
                chunks_needed: 1,
                tokens_per_chunk: total_tokens,
            };
        }

        ChunkEstimate {
            chunks_needed: total_tokens.div_ceil(available),
            tokens_per_chunk: available,
        }
    }
}

impl Default for LimitsCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Whether a model belongs to the reasoning class.
///
/// Reasoning models take their budget via the `max_completion_tokens`
/// parameter and reject sampling controls; detection is by name pattern
/// since providers expose no capability flag for it.
#[must_use]
pub fn is_reasoning_model(model_name: &str) -> bool {
    let name = model_name.to_lowercase();
    name.starts_with("o1")
        || name.starts_with("o3")
        || name.starts_with("o4")
        || name.contains("-reasoner")
        || name.contains("-thinking")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_exact_lookup() {
        let catalog = LimitsCatalog::builtin();
        let limits = catalog.lookup("gpt-4o", "OpenAI");
        assert_eq!(limits.max_completion_tokens, 16_384);
        assert_eq!(limits.max_context_tokens, 128_000);
    }

    #[test]
    fn test_fuzzy_lookup_dated_snapshot() {
        let catalog = LimitsCatalog::builtin();
        // A dated snapshot name containing a known base entry.
        let limits = catalog.lookup("gpt-4o-2024-11-20", "OpenAI");
        assert_eq!(limits.max_completion_tokens, 16_384);
    }

    #[test]
    fn test_unknown_model_falls_back_to_provider_default() {
        let catalog = LimitsCatalog::builtin();
        let limits = catalog.lookup("gpt-99-ultra", "OpenAI");
        assert_eq!(limits.max_context_tokens, 128_000);
        assert_eq!(limits.max_completion_tokens, 4_096);
    }

    #[test]
    fn test_unknown_provider_falls_back_to_global_default() {
        let catalog = LimitsCatalog::builtin();
        let limits = catalog.lookup("mystery-model", "NoSuchProvider");
        assert_eq!(limits, GLOBAL_DEFAULT);
    }

    #[test]
    fn test_lookup_is_total_and_positive() {
        let catalog = LimitsCatalog::builtin();
        for (model, provider) in [
            ("", ""),
            ("claude-3-5-sonnet-20241022", "Anthropic"),
            ("totally-made-up", "Ollama"),
            ("x", "y"),
        ] {
            assert!(catalog.lookup(model, provider).max_completion_tokens > 0);
        }
    }

    #[test]
    fn test_validate_clamps_fail_open() {
        let catalog = LimitsCatalog::builtin();
        let validation = catalog.validate("claude-3-5-sonnet-20241022", "Anthropic", 500_000);
        assert!(!validation.valid);
        assert_eq!(validation.actual_limit, 8_192);
        assert!(validation.error.is_some());

        let ok = catalog.validate("claude-3-5-sonnet-20241022", "Anthropic", 4_000);
        assert!(ok.valid);
        assert_eq!(ok.actual_limit, 8_192);
        assert!(ok.error.is_none());
    }

    #[test]
    fn test_required_chunks() {
        let catalog = LimitsCatalog::builtin();
        // gpt-4o: 16384 completion ceiling; 1000 reserved -> 15384/chunk
        let one = catalog.required_chunks(200, "gpt-4o", "OpenAI", 1_000);
        assert_eq!(one.chunks_needed, 1);

        let many = catalog.required_chunks(100_000, "gpt-4o", "OpenAI", 1_000);
        assert_eq!(many.tokens_per_chunk, 15_384);
        assert_eq!(many.chunks_needed, 100_000u64.div_ceil(15_384));
    }

    #[test]
    fn test_with_model_extension() {
        let catalog = LimitsCatalog::empty().with_model(ModelLimits::new(
            "tiny-model",
            "TestLab",
            2_048,
            512,
            "2025-01-01",
        ));
        assert_eq!(catalog.lookup("tiny-model", "TestLab").max_completion_tokens, 512);
    }

    #[test]
    fn test_with_model_duplicate_does_not_override() {
        let catalog = LimitsCatalog::empty()
            .with_model(ModelLimits::new("tiny-model", "TestLab", 2_048, 512, "2025-01-01"))
            .with_model(ModelLimits::new("tiny-model", "TestLab", 4_096, 1_024, "2025-02-01"));
        // the earlier entry still wins
        assert_eq!(catalog.lookup("tiny-model", "TestLab").max_completion_tokens, 512);
    }

    #[rstest]
    #[case("o1-preview", true)]
    #[case("o1-mini", true)]
    #[case("o3-mini-high", true)]
    #[case("deepseek-reasoner", true)]
    #[case("qwen-qwq-thinking", true)]
    #[case("gpt-4o", false)]
    #[case("claude-3-5-sonnet-20241022", false)]
    fn test_is_reasoning_model(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_reasoning_model(name), expected);
    }
}
