//! Message text scrubbing and inline model hints.
//!
//! Assistant text may carry reasoning wrappers (`<think>` blocks,
//! thought divs) that must not leak back into the conversation sent to
//! the backend. User text may carry leading `[Model: ...]` and
//! `[Provider: ...]` annotations that select a model for the rest of
//! the conversation; they are parsed off and stripped.

use regex::Regex;
use splitstream_core::{ContentPart, Message, MessageContent};
use std::sync::LazyLock;

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));

static THOUGHT_DIV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<div class="__thought__">.*?</div>"#).expect("valid regex"));

static MODEL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[Model:\s*([^\]]+)\]\s*").expect("valid regex"));

static PROVIDER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[Provider:\s*([^\]]+)\]\s*").expect("valid regex"));

/// Model selection parsed out of a user message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelHint {
    /// Requested model name, if annotated.
    pub model: Option<String>,
    /// Requested provider name, if annotated.
    pub provider: Option<String>,
}

/// Strip reasoning wrappers out of a piece of text.
#[must_use]
pub fn sanitize_text(text: &str) -> String {
    let text = THINK_BLOCK.replace_all(text, "");
    let text = THOUGHT_DIV.replace_all(&text, "");
    text.trim().to_string()
}

/// Sanitize every text part of a message, leaving opaque parts alone.
#[must_use]
pub fn sanitize_message(message: &Message) -> Message {
    let content = match &message.content {
        MessageContent::Text(text) => MessageContent::Text(sanitize_text(text)),
        MessageContent::Parts(parts) => MessageContent::Parts(
            parts
                .iter()
                .map(|part| match part.as_text() {
                    Some(text) => ContentPart::text(sanitize_text(text)),
                    None => part.clone(),
                })
                .collect(),
        ),
    };
    message.with_content(content)
}

/// Strip leading annotation tags off one piece of text.
fn strip_leading_tags(input: &str) -> (ModelHint, String) {
    let mut hint = ModelHint::default();
    let mut text = input.to_string();

    loop {
        if let Some(captures) = MODEL_TAG.captures(&text) {
            hint.model = Some(captures[1].trim().to_string());
            text = MODEL_TAG.replace(&text, "").into_owned();
            continue;
        }
        if let Some(captures) = PROVIDER_TAG.captures(&text) {
            hint.provider = Some(captures[1].trim().to_string());
            text = PROVIDER_TAG.replace(&text, "").into_owned();
            continue;
        }
        break;
    }

    (hint, text)
}

/// Parse and strip leading `[Model: ...]` / `[Provider: ...]`
/// annotations from a message's text.
///
/// Returns the hint and the message with the annotations removed.
/// Annotations may appear in either order; only leading tags count.
/// On multi-part content the first text part carries the annotations;
/// opaque parts and later text parts are untouched.
#[must_use]
pub fn extract_model_hint(message: &Message) -> (ModelHint, Message) {
    match &message.content {
        MessageContent::Text(text) => {
            let (hint, cleaned) = strip_leading_tags(text);
            (hint, message.with_content(cleaned))
        }
        MessageContent::Parts(parts) => {
            let mut hint = ModelHint::default();
            let mut seen_text = false;
            let mut new_parts = Vec::with_capacity(parts.len());

            for part in parts {
                match part.as_text() {
                    Some(text) if !seen_text => {
                        seen_text = true;
                        let (found, cleaned) = strip_leading_tags(text);
                        hint = found;
                        new_parts.push(ContentPart::text(cleaned));
                    }
                    _ => new_parts.push(part.clone()),
                }
            }

            (hint, message.with_content(new_parts))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_think_blocks() {
        let text = "before <think>secret\nplanning</think> after";
        assert_eq!(sanitize_text(text), "before  after");
    }

    #[test]
    fn test_sanitize_strips_thought_div() {
        let text = r#"<div class="__thought__">hmm</div>visible"#;
        assert_eq!(sanitize_text(text), "visible");
    }

    #[test]
    fn test_sanitize_message_keeps_opaque_parts() {
        let message = Message::assistant(vec![
            ContentPart::text("<think>x</think>answer"),
            ContentPart::opaque_bytes("image", vec![1u8]),
        ]);
        let cleaned = sanitize_message(&message);
        assert_eq!(cleaned.text(), "answer");
        match &cleaned.content {
            MessageContent::Parts(parts) => assert_eq!(parts.len(), 2),
            MessageContent::Text(_) => panic!("expected parts"),
        }
    }

    #[test]
    fn test_extract_model_hint_both_tags() {
        let message = Message::user("[Model: gpt-4o]\n\n[Provider: OpenAI]\n\nactual question");
        let (hint, cleaned) = extract_model_hint(&message);
        assert_eq!(hint.model.as_deref(), Some("gpt-4o"));
        assert_eq!(hint.provider.as_deref(), Some("OpenAI"));
        assert_eq!(cleaned.text(), "actual question");
    }

    #[test]
    fn test_extract_model_hint_absent() {
        let message = Message::user("plain question");
        let (hint, cleaned) = extract_model_hint(&message);
        assert_eq!(hint, ModelHint::default());
        assert_eq!(cleaned.text(), "plain question");
    }

    #[test]
    fn test_extract_model_hint_from_parts() {
        let message = Message::user(vec![
            ContentPart::opaque_bytes("image", vec![0u8]),
            ContentPart::text("[Model: gpt-4o]\n\nwhat is in the image?"),
            ContentPart::text("[Model: not-a-tag-here]"),
        ]);
        let (hint, cleaned) = extract_model_hint(&message);
        assert_eq!(hint.model.as_deref(), Some("gpt-4o"));
        match &cleaned.content {
            MessageContent::Parts(parts) => {
                assert!(!parts[0].is_text());
                assert_eq!(parts[1].as_text(), Some("what is in the image?"));
                // only the first text part is parsed
                assert_eq!(parts[2].as_text(), Some("[Model: not-a-tag-here]"));
            }
            MessageContent::Text(_) => panic!("expected parts"),
        }
    }

    #[test]
    fn test_mid_text_tags_not_parsed() {
        let message = Message::user("tell me about [Model: gpt-4o] syntax");
        let (hint, cleaned) = extract_model_hint(&message);
        assert_eq!(hint.model, None);
        assert_eq!(cleaned.text(), "tell me about [Model: gpt-4o] syntax");
    }
}
