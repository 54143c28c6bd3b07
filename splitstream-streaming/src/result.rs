//! The streaming result returned to callers.
//!
//! A [`StreamingResult`] is the one shape every completion produces,
//! whether the backend streamed it natively or the orchestrator
//! synthesized it from merged chunk results. Callers cannot tell the two
//! apart: both expose an incremental event stream and both resolve to a
//! [`CollectedResponse`] with full text, finish reason and usage.

use chrono::{DateTime, Utc};
use futures::{Stream, StreamExt};
use splitstream_core::{FinishReason, TokenUsage};
use std::pin::Pin;

use crate::error::{StreamError, StreamResult};
use crate::events::StreamEvent;

/// Boxed stream of completion events.
pub type TextStream = Pin<Box<dyn Stream<Item = StreamResult<StreamEvent>> + Send>>;

/// A fully drained completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedResponse {
    /// The complete response text.
    pub text: String,
    /// Why the completion stopped.
    pub finish_reason: FinishReason,
    /// Token accounting.
    pub usage: TokenUsage,
    /// When draining completed.
    pub timestamp: DateTime<Utc>,
}

/// A completion result that can be consumed incrementally or drained.
pub struct StreamingResult {
    stream: TextStream,
}

impl std::fmt::Debug for StreamingResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResult").finish_non_exhaustive()
    }
}

impl StreamingResult {
    /// Wrap a backend's native event stream.
    #[must_use]
    pub fn new(stream: TextStream) -> Self {
        Self { stream }
    }

    /// Build a result from a fixed sequence of events.
    #[must_use]
    pub fn from_events(events: Vec<StreamResult<StreamEvent>>) -> Self {
        Self {
            stream: Box::pin(futures::stream::iter(events)),
        }
    }

    /// Synthesize a result from already-resolved text.
    ///
    /// The text is yielded as a single delta followed by a `stop` finish
    /// event; already-collected text is never re-streamed incrementally.
    #[must_use]
    pub fn from_text(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self::from_events(vec![
            Ok(StreamEvent::delta(text)),
            Ok(StreamEvent::finish(FinishReason::Stop, usage)),
        ])
    }

    /// Take the underlying event stream.
    #[must_use]
    pub fn into_stream(self) -> TextStream {
        self.stream
    }

    /// Pull the next event off the stream.
    pub async fn next_event(&mut self) -> Option<StreamResult<StreamEvent>> {
        self.stream.next().await
    }

    /// Drain the stream to completion.
    ///
    /// Suspends until the backend signals end-of-stream or error. A
    /// stream that ends without a finish event still resolves, with
    /// finish reason `other("eos")` and empty usage. A mid-stream error
    /// aborts the drain and is returned as-is.
    pub async fn collect(mut self) -> StreamResult<CollectedResponse> {
        let mut text = String::new();
        let mut finish: Option<(FinishReason, TokenUsage)> = None;

        while let Some(event) = self.stream.next().await {
            match event? {
                StreamEvent::Delta { text: delta } => text.push_str(&delta),
                StreamEvent::Finish { reason, usage } => {
                    finish = Some((reason, usage));
                }
            }
        }

        let (finish_reason, usage) =
            finish.unwrap_or((FinishReason::Other("eos".to_string()), TokenUsage::new()));

        Ok(CollectedResponse {
            text,
            finish_reason,
            usage,
            timestamp: Utc::now(),
        })
    }
}
