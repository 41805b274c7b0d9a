/*!
 * Gateway to the text generation service.
 *
 * Wraps a `Provider` with the four operations the translator needs. None of
 * them return an error: a failed call degrades to the best text available
 * and is reported as `Generation::Fallback` so callers can tell the paths
 * apart.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, warn};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

use crate::app_config::ApiConfig;
use crate::errors::ProviderError;
use crate::providers::openai::OpenAI;
use crate::providers::{GenerationRequest, Provider, RequestPurpose};

use super::document::TermPair;
use super::prompts::{self, Prompt};

/// Review result used when the critique call fails or returns nothing
pub const NO_REVIEW_SUGGESTIONS: &str = "No suggestions available.";

/// Sampling temperature for term discovery and the first translation
const CREATIVE_TEMPERATURE: f32 = 1.3;

/// Sampling temperature for review and polish
const PRECISE_TEMPERATURE: f32 = 0.3;

static TERM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:\n]*?[^\s:][^:\n]*?)\s*:\s*(.+)$").expect("valid term line pattern")
});

/// Text produced by a gateway operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The model answered
    Generated(String),
    /// The call failed and the operation's fallback text was used instead
    Fallback(String),
}

impl Generation {
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) | Self::Fallback(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Generated(text) | Self::Fallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Token usage statistics for a run
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Number of calls issued
    pub requests: u64,

    /// Number of calls that failed
    pub failures: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent waiting on the service
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,
}

impl TokenUsageStats {
    pub fn with_provider(provider: impl Into<String>) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            requests: 0,
            failures: 0,
            start_time: Instant::now(),
            api_duration: Duration::ZERO,
            provider: provider.into(),
        }
    }

    /// Add token usage numbers reported by the service
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Token Usage Summary:\n\
             Provider: {}\n\
             Requests: {} ({} failed)\n\
             Prompt tokens: {}\n\
             Completion tokens: {}\n\
             Total tokens: {}\n\
             Elapsed time: {:.2} minutes\n\
             API request time: {:.2} minutes\n\
             Tokens per minute: {:.2}",
            self.provider,
            self.requests,
            self.failures,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            self.start_time.elapsed().as_secs_f64() / 60.0,
            self.api_duration.as_secs_f64() / 60.0,
            self.tokens_per_minute()
        )
    }
}

/// The single seam between the translator and the model service
pub struct ModelGateway {
    provider: Arc<dyn Provider>,
    chat_model: String,
    reasoner_model: String,
    max_tokens: u32,
    usage: Mutex<TokenUsageStats>,
}

impl std::fmt::Debug for ModelGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelGateway")
            .field("provider", &self.provider.name())
            .field("chat_model", &self.chat_model)
            .field("reasoner_model", &self.reasoner_model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl ModelGateway {
    /// Create a gateway over an arbitrary provider
    pub fn new(provider: Arc<dyn Provider>, config: &ApiConfig) -> Self {
        let usage = TokenUsageStats::with_provider(provider.name());
        Self {
            provider,
            chat_model: config.chat_model.clone(),
            reasoner_model: config.reasoner_model.clone(),
            max_tokens: config.max_tokens,
            usage: Mutex::new(usage),
        }
    }

    /// Create a gateway talking to the configured hosted service
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(Arc::new(OpenAI::new_with_config(config)), config)
    }

    /// Snapshot of the accumulated usage statistics
    pub fn usage(&self) -> TokenUsageStats {
        self.usage.lock().clone()
    }

    /// Extract glossary candidates from a source text
    ///
    /// Never fails: service errors and unparsable output yield an empty list.
    pub async fn extract_terms(&self, source_text: &str, instructions: &str) -> Vec<TermPair> {
        let prompt = Prompt {
            system: instructions.to_string(),
            user: source_text.to_string(),
        };

        match self.call(RequestPurpose::ExtractTerms, &self.chat_model, prompt, CREATIVE_TEMPERATURE).await {
            Ok(text) => parse_term_lines(&text),
            Err(e) => {
                error!("Term extraction failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Translate a prose unit, falling back to the source text
    pub async fn translate(&self, source_text: &str, glossary: &str) -> Generation {
        let prompt = prompts::translation(source_text, glossary);
        match self.call(RequestPurpose::Translate, &self.chat_model, prompt, CREATIVE_TEMPERATURE).await {
            Ok(text) => Generation::Generated(text),
            Err(e) => {
                error!("Translation failed, keeping source text: {}", e);
                Generation::Fallback(source_text.to_string())
            }
        }
    }

    /// Critique a translation, falling back to `NO_REVIEW_SUGGESTIONS`
    pub async fn review(&self, source_text: &str, translated_text: &str, glossary: &str) -> Generation {
        let prompt = prompts::review(source_text, translated_text, glossary);
        match self.call(RequestPurpose::Review, &self.chat_model, prompt, PRECISE_TEMPERATURE).await {
            Ok(text) if !text.trim().is_empty() => Generation::Generated(text),
            Ok(_) => {
                warn!("Review returned no content");
                Generation::Fallback(NO_REVIEW_SUGGESTIONS.to_string())
            }
            Err(e) => {
                error!("Review failed: {}", e);
                Generation::Fallback(NO_REVIEW_SUGGESTIONS.to_string())
            }
        }
    }

    /// Refine a translation using the review notes, falling back to the translation
    pub async fn polish(
        &self,
        source_text: &str,
        translated_text: &str,
        review_notes: &str,
        glossary: &str,
    ) -> Generation {
        let prompt = prompts::polish(source_text, translated_text, review_notes, glossary);
        match self.call(RequestPurpose::Polish, &self.reasoner_model, prompt, PRECISE_TEMPERATURE).await {
            Ok(text) if !text.trim().is_empty() => Generation::Generated(text),
            Ok(_) => {
                warn!("Polish returned no content, keeping draft translation");
                Generation::Fallback(translated_text.to_string())
            }
            Err(e) => {
                error!("Polish failed, keeping draft translation: {}", e);
                Generation::Fallback(translated_text.to_string())
            }
        }
    }

    async fn call(
        &self,
        purpose: RequestPurpose,
        model: &str,
        prompt: Prompt,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let request = GenerationRequest {
            purpose,
            model: model.to_string(),
            system_prompt: prompt.system,
            user_prompt: prompt.user,
            temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Issuing {} request to {} (temperature {})", purpose, model, temperature);
        let start = Instant::now();
        let result = self.provider.generate(request).await;
        let elapsed = start.elapsed();

        let mut usage = self.usage.lock();
        usage.requests += 1;
        usage.api_duration += elapsed;
        match result {
            Ok(response) => {
                usage.add_token_usage(response.prompt_tokens, response.completion_tokens);
                debug!(
                    "{} on {} took {:.2}s, tokens in/out: {:?}/{:?}",
                    purpose,
                    model,
                    elapsed.as_secs_f64(),
                    response.prompt_tokens,
                    response.completion_tokens
                );
                Ok(response.text)
            }
            Err(e) => {
                usage.failures += 1;
                Err(e)
            }
        }
    }
}

/// Parse `term: translation` lines out of a model response
pub fn parse_term_lines(text: &str) -> Vec<TermPair> {
    let mut terms = Vec::new();
    for line in text.lines() {
        let Some(captures) = TERM_LINE.captures(line) else {
            continue;
        };

        let source = captures[1].trim();
        let target = captures[2].trim();
        if target.is_empty() {
            warn!("Dropping term without translation: {}", source);
            continue;
        }
        terms.push(TermPair::new(source, target));
    }
    terms
}
