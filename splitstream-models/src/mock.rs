//! Mock and function-based backends for testing.
//!
//! - [`MockBackend`]: scripted outcomes consumed in order, with full
//!   request recording for assertions
//! - [`FunctionBackend`]: a backend driven by a closure
//!
//! # Examples
//!
//! ```rust
//! use splitstream_models::MockBackend;
//!
//! let backend = MockBackend::new("test-model", "TestLab")
//!     .with_text("First answer")
//!     .with_text("Second answer");
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use splitstream_core::{estimate_messages, estimate_text, FinishReason, TokenUsage};
use splitstream_streaming::{StreamError, StreamEvent, StreamingResult};
use std::sync::Arc;

use crate::backend::{CompletionBackend, CompletionRequest};
use crate::error::BackendError;

/// One scripted outcome for a [`MockBackend`] submit call.
#[derive(Debug)]
pub enum MockOutcome {
    /// Stream this text (as word deltas) and finish with `stop`.
    Text(String),
    /// Fail the submit call itself.
    SubmitError(BackendError),
    /// Accept the submit, then fail mid-stream after some text.
    StreamError {
        /// Text emitted before the failure.
        prefix: String,
        /// The mid-stream error message.
        message: String,
    },
}

/// A completion backend with pre-scripted outcomes.
///
/// Outcomes are consumed in submit order; once the script is exhausted
/// every call answers with a default text response. All requests are
/// recorded and can be inspected afterwards.
#[derive(Debug, Clone)]
pub struct MockBackend {
    name: String,
    provider: String,
    outcomes: Arc<Mutex<Vec<MockOutcome>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockBackend {
    /// Create a mock backend.
    #[must_use]
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            outcomes: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a text response.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.outcomes.lock().push(MockOutcome::Text(text.into()));
        self
    }

    /// Queue a submit failure.
    #[must_use]
    pub fn with_submit_error(self, error: BackendError) -> Self {
        self.outcomes.lock().push(MockOutcome::SubmitError(error));
        self
    }

    /// Queue a mid-stream failure after `prefix` has streamed.
    #[must_use]
    pub fn with_stream_error(self, prefix: impl Into<String>, message: impl Into<String>) -> Self {
        self.outcomes.lock().push(MockOutcome::StreamError {
            prefix: prefix.into(),
            message: message.into(),
        });
        self
    }

    /// Requests recorded so far, in submit order.
    #[must_use]
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    /// Number of submit calls seen.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn streamed_text(request: &CompletionRequest, text: &str) -> StreamingResult {
        let usage = TokenUsage::with_tokens(
            estimate_text(&request.system_prompt) + estimate_messages(&request.messages),
            estimate_text(text),
        );

        // Word-by-word deltas so drains actually accumulate.
        let mut events: Vec<Result<StreamEvent, StreamError>> = text
            .split_inclusive(' ')
            .map(|word| Ok(StreamEvent::delta(word)))
            .collect();
        events.push(Ok(StreamEvent::finish(FinishReason::Stop, usage)));
        StreamingResult::from_events(events)
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        &self.provider
    }

    async fn submit(&self, request: &CompletionRequest) -> Result<StreamingResult, BackendError> {
        self.requests.lock().push(request.clone());

        let outcome = {
            let mut outcomes = self.outcomes.lock();
            if outcomes.is_empty() {
                None
            } else {
                Some(outcomes.remove(0))
            }
        };

        match outcome {
            None => Ok(Self::streamed_text(request, "Mock response")),
            Some(MockOutcome::Text(text)) => Ok(Self::streamed_text(request, &text)),
            Some(MockOutcome::SubmitError(error)) => Err(error),
            Some(MockOutcome::StreamError { prefix, message }) => {
                Ok(StreamingResult::from_events(vec![
                    Ok(StreamEvent::delta(prefix)),
                    Err(StreamError::Backend(message)),
                ]))
            }
        }
    }
}

/// Callback signature for [`FunctionBackend`].
pub type BackendFn =
    Box<dyn Fn(&CompletionRequest) -> Result<String, BackendError> + Send + Sync>;

/// A backend driven by a local function.
///
/// More flexible than [`MockBackend`]: the closure sees the full request
/// and can answer based on its contents.
pub struct FunctionBackend {
    name: String,
    provider: String,
    function: BackendFn,
}

impl std::fmt::Debug for FunctionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionBackend")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl FunctionBackend {
    /// Create a function backend.
    pub fn new<F>(name: impl Into<String>, provider: impl Into<String>, function: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, BackendError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            provider: provider.into(),
            function: Box::new(function),
        }
    }
}

#[async_trait]
impl CompletionBackend for FunctionBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        &self.provider
    }

    async fn submit(&self, request: &CompletionRequest) -> Result<StreamingResult, BackendError> {
        let text = (self.function)(request)?;
        Ok(MockBackend::streamed_text(request, &text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TokenBudget;
    use splitstream_core::Message;

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest::new("sys", vec![Message::user(text)], TokenBudget::MaxTokens(100))
    }

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let backend = MockBackend::new("m", "TestLab")
            .with_text("one")
            .with_text("two");

        let a = backend.submit(&request("q1")).await.unwrap();
        assert_eq!(a.collect().await.unwrap().text, "one");
        let b = backend.submit(&request("q2")).await.unwrap();
        assert_eq!(b.collect().await.unwrap().text, "two");
        // exhausted script falls back to the default
        let c = backend.submit(&request("q3")).await.unwrap();
        assert_eq!(c.collect().await.unwrap().text, "Mock response");

        assert_eq!(backend.call_count(), 3);
        assert_eq!(backend.recorded_requests()[1].messages[0].text(), "q2");
    }

    #[tokio::test]
    async fn test_submit_error_outcome() {
        let backend =
            MockBackend::new("m", "TestLab").with_submit_error(BackendError::http(500, "boom"));
        let err = backend.submit(&request("q")).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_stream_error_outcome() {
        let backend = MockBackend::new("m", "TestLab").with_stream_error("part", "cut off");
        let result = backend.submit(&request("q")).await.unwrap();
        assert!(result.collect().await.is_err());
    }

    #[tokio::test]
    async fn test_function_backend_sees_request() {
        let backend = FunctionBackend::new("f", "TestLab", |req: &CompletionRequest| {
            Ok(format!("echo: {}", req.messages[0].text()))
        });
        let result = backend.submit(&request("hello")).await.unwrap();
        assert_eq!(result.collect().await.unwrap().text, "echo: hello");
    }

    #[tokio::test]
    async fn test_mock_usage_is_estimated() {
        let backend = MockBackend::new("m", "TestLab").with_text("three words here");
        let collected = backend
            .submit(&request("some question"))
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();
        assert!(collected.usage.prompt_tokens > 0);
        assert_eq!(collected.usage.completion_tokens, estimate_text("three words here"));
    }
}
