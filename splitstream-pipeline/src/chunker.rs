//! Conversation chunking against a token budget.
//!
//! When a conversation does not fit one completion request, it is
//! partitioned into an ordered list of [`Chunk`]s: messages are packed
//! greedily, and a single message that alone exceeds the budget is split
//! on sentence boundaries. Chunks are built in two phases, message
//! groups first and final records second, so no chunk ever carries a
//! placeholder count.

use serde::{Deserialize, Serialize};
use splitstream_core::{
    estimate_message, estimate_messages, estimate_text, ContentPart, Message, MessageContent,
};
use tracing::{debug, info};

/// Headroom subtracted when splitting plain-text content, covering the
/// metadata overhead of the derived messages.
const TEXT_SPLIT_HEADROOM: u64 = 100;

/// Larger headroom for multi-part content, whose opaque parts add
/// provider-side formatting cost the estimator cannot see.
const PARTS_SPLIT_HEADROOM: u64 = 200;

/// One sub-request's worth of conversation.
///
/// Produced once per orchestration call and consumed in `chunk_index`
/// order; never reordered or mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Messages for this sub-request.
    pub messages: Vec<Message>,
    /// Whether this chunk is one piece of a split conversation.
    pub is_partial: bool,
    /// Zero-based position in the chunk sequence.
    pub chunk_index: usize,
    /// Total number of chunks produced by the same call.
    pub total_chunks: usize,
}

/// Split text into pieces that each fit `max_tokens`.
///
/// Splits on sentence boundaries (`.`, `!`, `?`) and re-packs sentences
/// greedily. Text already under budget comes back as a single piece.
fn split_long_text(text: &str, max_tokens: u64) -> Vec<String> {
    if estimate_text(text) <= max_tokens {
        return vec![text.to_string()];
    }

    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_tokens = 0u64;

    for sentence in sentences {
        let sentence_tokens = estimate_text(sentence);

        if current_tokens + sentence_tokens > max_tokens && !current.is_empty() {
            pieces.push(current.trim().to_string());
            current = sentence.to_string();
            current_tokens = sentence_tokens;
        } else {
            if !current.is_empty() {
                current.push_str(". ");
            }
            current.push_str(sentence);
            current_tokens += sentence_tokens;
        }
    }

    if !current.is_empty() {
        pieces.push(current.trim().to_string());
    }

    pieces
}

/// Label a derived sub-text with its part number. The first part is
/// left unmarked.
fn label_part(index: usize, text: &str) -> String {
    if index == 0 {
        text.to_string()
    } else {
        format!("(part {})\n\n{}", index + 1, text)
    }
}

/// Split one over-budget message into a sequence of derived messages.
///
/// Plain text splits on sentence boundaries. Multi-part content splits
/// only its text parts; opaque parts are preserved verbatim on the
/// first derived message and never duplicated. A message with nothing
/// splittable is returned as-is even though it nominally exceeds the
/// budget.
fn split_message(message: &Message, max_tokens: u64) -> Vec<Message> {
    if estimate_message(message) <= max_tokens {
        return vec![message.clone()];
    }

    match &message.content {
        MessageContent::Text(text) => {
            let budget = max_tokens.saturating_sub(TEXT_SPLIT_HEADROOM).max(1);
            split_long_text(text, budget)
                .iter()
                .enumerate()
                .map(|(i, piece)| message.with_content(label_part(i, piece)))
                .collect()
        }
        MessageContent::Parts(parts) => {
            let text_parts: Vec<&str> = parts.iter().filter_map(ContentPart::as_text).collect();
            let opaque_parts: Vec<ContentPart> =
                parts.iter().filter(|p| !p.is_text()).cloned().collect();

            if text_parts.is_empty() {
                // Nothing splittable.
                return vec![message.clone()];
            }

            let combined = text_parts.join("\n\n");
            let budget = max_tokens.saturating_sub(PARTS_SPLIT_HEADROOM).max(1);

            split_long_text(&combined, budget)
                .iter()
                .enumerate()
                .map(|(i, piece)| {
                    let mut new_parts = if i == 0 {
                        opaque_parts.clone()
                    } else {
                        Vec::new()
                    };
                    new_parts.push(ContentPart::text(label_part(i, piece)));
                    message.with_content(new_parts)
                })
                .collect()
        }
    }
}

/// Partition a conversation into chunks that each fit the budget.
///
/// `system_prompt_tokens` is reserved off the top of every chunk's
/// budget. A conversation that fits entirely comes back as one
/// non-partial chunk; otherwise messages are packed greedily, with
/// over-budget single messages split via [`split_message`]. Every chunk
/// of a multi-chunk result is partial, and `total_chunks` is identical
/// across the result.
///
/// Pure with respect to its inputs: identical inputs produce
/// structurally identical output, and the input messages are never
/// mutated.
#[must_use]
pub fn chunk_messages(
    messages: &[Message],
    max_tokens_per_chunk: u64,
    system_prompt_tokens: u64,
) -> Vec<Chunk> {
    let available = max_tokens_per_chunk.saturating_sub(system_prompt_tokens);
    let total_tokens = estimate_messages(messages);

    debug!(total_tokens, available, "sizing conversation against budget");

    if total_tokens <= available {
        return vec![Chunk {
            messages: messages.to_vec(),
            is_partial: false,
            chunk_index: 0,
            total_chunks: 1,
        }];
    }

    // Phase one: message groups.
    let mut groups: Vec<Vec<Message>> = Vec::new();
    let mut current: Vec<Message> = Vec::new();
    let mut current_tokens = 0u64;

    for message in messages {
        let message_tokens = estimate_message(message);

        if message_tokens > available {
            // Flush whatever is pending, then split the oversized
            // message into single-message groups.
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
                current_tokens = 0;
            }
            for sub in split_message(message, available) {
                groups.push(vec![sub]);
            }
        } else if current_tokens + message_tokens > available {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            current.push(message.clone());
            current_tokens = message_tokens;
        } else {
            current.push(message.clone());
            current_tokens += message_tokens;
        }
    }

    if !current.is_empty() {
        groups.push(current);
    }

    // Phase two: final records with true index and count.
    let total_chunks = groups.len();
    let chunks: Vec<Chunk> = groups
        .into_iter()
        .enumerate()
        .map(|(chunk_index, messages)| Chunk {
            messages,
            is_partial: total_chunks > 1,
            chunk_index,
            total_chunks,
        })
        .collect();

    info!(total_chunks, "conversation split into chunks");

    chunks
}
