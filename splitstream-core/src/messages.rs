//! Conversation message types.
//!
//! Messages carry either plain text or an ordered list of typed parts.
//! Non-text parts (images, tool references, raw bytes) are modeled as
//! opaque payloads: the pipeline never inspects them, only decides where
//! they travel when a message has to be split.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System instructions.
    System,
    /// End-user input.
    User,
    /// Model output.
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Source of an opaque (non-text) content part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum OpaqueSource {
    /// Inline binary payload.
    Bytes {
        /// The raw data.
        #[serde(with = "bytes_serde")]
        data: Bytes,
    },
    /// Remote reference.
    Url {
        /// Location of the payload.
        url: Url,
    },
}

mod bytes_serde {
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        data.as_ref().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        Ok(Bytes::from(Vec::<u8>::deserialize(deserializer)?))
    }
}

/// Individual content part in a multi-part message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// Non-text content the pipeline must carry through untouched.
    Opaque {
        /// Kind label, e.g. `"image"` or `"tool_ref"`.
        kind: String,
        /// Where the payload lives.
        #[serde(flatten)]
        source: OpaqueSource,
        /// Media type, if known.
        #[serde(skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
    },
}

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an opaque part from inline bytes.
    #[must_use]
    pub fn opaque_bytes(kind: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::Opaque {
            kind: kind.into(),
            source: OpaqueSource::Bytes { data: data.into() },
            media_type: None,
        }
    }

    /// Create an opaque part referencing a URL.
    #[must_use]
    pub fn opaque_url(kind: impl Into<String>, url: Url) -> Self {
        Self::Opaque {
            kind: kind.into(),
            source: OpaqueSource::Url { url },
            media_type: None,
        }
    }

    /// Set the media type on an opaque part. No-op for text parts.
    #[must_use]
    pub fn with_media_type(mut self, media: impl Into<String>) -> Self {
        if let Self::Opaque { media_type, .. } = &mut self {
            *media_type = Some(media.into());
        }
        self
    }

    /// Check whether this is a text part.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text { .. })
    }

    /// Get the text if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Opaque { .. } => None,
        }
    }
}

/// Message content: plain text or an ordered sequence of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content.
    Text(String),
    /// Multi-part content.
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Create text content.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create multi-part content.
    #[must_use]
    pub fn parts(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }

    /// Check if this is plain text.
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Concatenate all text content, joining multi-part text with blank lines.
    #[must_use]
    pub fn joined_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(ContentPart::as_text)
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    /// Check whether there is no text and nothing opaque either.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Parts(parts) => parts.is_empty(),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

/// A single conversation message.
///
/// Immutable once constructed: chunking produces new derived messages,
/// never mutates originals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the message.
    pub role: Role,
    /// What it says.
    pub content: MessageContent,
}

impl Message {
    /// Create a message.
    #[must_use]
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// All text carried by the message.
    #[must_use]
    pub fn text(&self) -> String {
        self.content.joined_text()
    }

    /// Derive a copy of this message with different content.
    #[must_use]
    pub fn with_content(&self, content: impl Into<MessageContent>) -> Self {
        Self {
            role: self.role,
            content: content.into(),
        }
    }
}

/// Why a completion finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of output.
    Stop,
    /// Token budget exhausted.
    Length,
    /// Provider content filter fired.
    ContentFilter,
    /// Backend reported an error mid-stream.
    Error,
    /// Anything else the backend reported.
    Other(String),
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Stop => write!(f, "stop"),
            FinishReason::Length => write!(f, "length"),
            FinishReason::ContentFilter => write!(f, "content_filter"),
            FinishReason::Error => write!(f, "error"),
            FinishReason::Other(s) => write!(f, "{s}"),
        }
    }
}
