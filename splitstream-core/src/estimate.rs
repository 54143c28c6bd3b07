//! Approximate token cost estimation.
//!
//! This is a budgeting heuristic, not a tokenizer: one whitespace-separated
//! word counts as roughly 1.3 tokens, and each message pays a fixed
//! overhead for role and formatting metadata. The estimate only needs to
//! be monotonic and cheap; exactness is explicitly out of contract.

use crate::messages::{Message, MessageContent};

/// Approximate tokens per whitespace-separated word.
pub const TOKENS_PER_WORD: f64 = 1.3;

/// Fixed per-message overhead for role/formatting metadata.
pub const MESSAGE_OVERHEAD_TOKENS: u64 = 50;

/// Estimate the token cost of a piece of text.
///
/// Monotonic: extending a text never lowers its estimate.
#[must_use]
pub fn estimate_text(text: &str) -> u64 {
    let words = text.split_whitespace().count() as f64;
    (words * TOKENS_PER_WORD).ceil() as u64
}

/// Estimate the token cost of a whole message.
///
/// Only text parts contribute; opaque parts are assumed to be accounted
/// for by the provider separately. The fixed
/// [`MESSAGE_OVERHEAD_TOKENS`] is always added.
#[must_use]
pub fn estimate_message(message: &Message) -> u64 {
    let text_tokens = match &message.content {
        MessageContent::Text(text) => estimate_text(text),
        MessageContent::Parts(parts) => parts
            .iter()
            .filter_map(|part| part.as_text())
            .map(estimate_text)
            .sum(),
    };
    text_tokens + MESSAGE_OVERHEAD_TOKENS
}

/// Estimate the total token cost of a message sequence.
#[must_use]
pub fn estimate_messages(messages: &[Message]) -> u64 {
    messages.iter().map(estimate_message).sum()
}
