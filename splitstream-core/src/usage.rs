//! Token usage accounting.

use serde::{Deserialize, Serialize};

/// Token usage for one logical completion.
///
/// On the chunked path these are estimated counts summed across every
/// sub-request, so they are comparable to (but not guaranteed equal to)
/// what a provider would have reported for a one-shot call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt (system prompt + messages).
    pub prompt_tokens: u64,
    /// Tokens in the completion.
    pub completion_tokens: u64,
    /// Prompt + completion.
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Create empty usage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create usage from prompt and completion counts.
    #[must_use]
    pub fn with_tokens(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Accumulate another usage record into this one.
    pub fn merge(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens = self.prompt_tokens + self.completion_tokens;
    }
}
