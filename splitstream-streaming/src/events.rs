//! Stream events emitted by a completion backend.

use serde::{Deserialize, Serialize};
use splitstream_core::{FinishReason, TokenUsage};

/// Event on a completion text stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text.
    Delta {
        /// The appended text.
        text: String,
    },
    /// Terminal event carrying finish metadata.
    Finish {
        /// Why the completion stopped.
        reason: FinishReason,
        /// Token accounting for the request.
        usage: TokenUsage,
    },
}

impl StreamEvent {
    /// Create a delta event.
    #[must_use]
    pub fn delta(text: impl Into<String>) -> Self {
        Self::Delta { text: text.into() }
    }

    /// Create a finish event.
    #[must_use]
    pub fn finish(reason: FinishReason, usage: TokenUsage) -> Self {
        Self::Finish { reason, usage }
    }

    /// Get the delta text, if this is a delta.
    #[must_use]
    pub fn as_delta(&self) -> Option<&str> {
        match self {
            Self::Delta { text } => Some(text),
            Self::Finish { .. } => None,
        }
    }

    /// Check if this is the terminal event.
    #[must_use]
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_delta() {
        assert_eq!(StreamEvent::delta("hi").as_delta(), Some("hi"));
        assert_eq!(
            StreamEvent::finish(FinishReason::Stop, TokenUsage::new()).as_delta(),
            None
        );
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&StreamEvent::delta("x")).unwrap();
        assert!(json.contains("\"event\":\"delta\""));
    }
}
