/*!
 * Mock provider implementation for testing.
 *
 * This module provides a provider that never touches the network:
 * - `MockProvider::working()` - Always succeeds, echoing a tagged copy of the prompt
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty()` - Always succeeds with an empty text
 * - `MockProvider::with_responder(..)` - Scripted responses per request
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{GenerationRequest, GenerationResponse, Provider};

/// Scripted response generator
pub type Responder = Arc<dyn Fn(&GenerationRequest) -> Result<String, ProviderError> + Send + Sync>;

/// Per-request artificial latency in milliseconds
pub type DelayFn = Arc<dyn Fn(&GenerationRequest) -> u64 + Send + Sync>;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
}

/// Mock provider for testing gateway and pipeline behavior
#[derive(Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    responder: Option<Responder>,
    /// Artificial latency (optional)
    delay: Option<DelayFn>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("behavior", &self.behavior)
            .field("request_count", &self.request_count())
            .finish_non_exhaustive()
    }
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            responder: None,
            delay: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a working mock driven by a response generator
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String, ProviderError> + Send + Sync + 'static,
    {
        let mut provider = Self::working();
        provider.responder = Some(Arc::new(responder));
        provider
    }

    /// Sleep before answering each request
    pub fn with_delay<F>(mut self, delay: F) -> Self
    where
        F: Fn(&GenerationRequest) -> u64 + Send + Sync + 'static,
    {
        self.delay = Some(Arc::new(delay));
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    fn simulated_failure(message: String) -> ProviderError {
        ProviderError::ApiError {
            status_code: 503,
            message,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = &self.delay {
            let delay_ms = delay(&request);
            if delay_ms > 0 {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
            }
        }

        let text = match self.behavior {
            MockBehavior::Failing => {
                return Err(Self::simulated_failure("Simulated provider failure".to_string()));
            }
            MockBehavior::Empty => String::new(),
            MockBehavior::Intermittent { fail_every } if count % fail_every == fail_every - 1 => {
                return Err(Self::simulated_failure(format!("Simulated intermittent failure (request #{})", count + 1)));
            }
            MockBehavior::Working | MockBehavior::Intermittent { .. } => match &self.responder {
                Some(responder) => responder(&request)?,
                None => format!("[{}] {}{}", request.purpose, request.system_prompt, request.user_prompt),
            },
        };

        Ok(GenerationResponse {
            prompt_tokens: Some((request.system_prompt.len() + request.user_prompt.len()) as u64),
            completion_tokens: Some(text.len() as u64),
            text,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
