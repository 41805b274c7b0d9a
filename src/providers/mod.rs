/*!
 * Provider implementations for the text generation service.
 *
 * This module contains the client for the hosted model service and a
 * scripted stand-in used by the test suite:
 * - OpenAI: OpenAI-compatible chat completions API (DeepSeek and friends)
 * - Mock: In-process provider with programmable responses
 */

use async_trait::async_trait;
use std::fmt::{self, Debug};

use crate::errors::ProviderError;

/// Logical operation a generation request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestPurpose {
    ExtractTerms,
    Translate,
    Review,
    Polish,
}

impl fmt::Display for RequestPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ExtractTerms => "extract-terms",
            Self::Translate => "translate",
            Self::Review => "review",
            Self::Polish => "polish",
        };
        f.write_str(name)
    }
}

/// A single request/response exchange with the model service
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Operation that issued the request (never sent over the wire)
    pub purpose: RequestPurpose,
    /// Model identifier
    pub model: String,
    /// System instructions
    pub system_prompt: String,
    /// User instructions
    pub user_prompt: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output length in tokens
    pub max_tokens: u32,
}

/// Generated text plus whatever usage data the service reported
#[derive(Debug, Clone, Default)]
pub struct GenerationResponse {
    pub text: String,
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
}

impl GenerationResponse {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Common trait for all text generation providers
///
/// The gateway only depends on this trait, so the hosted service and the
/// test double can be used interchangeably.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<GenerationResponse, ProviderError>` - The generated text or an error
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError>;

    /// Short provider name for log lines
    fn name(&self) -> &str;
}

pub mod mock;
pub mod openai;
