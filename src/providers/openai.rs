use std::time::{Duration, Instant};
use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use reqwest::{Client, StatusCode};
use log::{debug, error};

use crate::app_config::ApiConfig;
use crate::errors::ProviderError;
use super::{GenerationRequest, GenerationResponse, Provider};

/// OpenAI-compatible client for the hosted chat completions API
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.deepseek.com/v1`
    endpoint: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl std::fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAI")
            .field("endpoint", &self.endpoint)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Chat completions request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    #[serde(default)]
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Individual choice in a completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
}

/// Chat completions response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl OpenAIRequest {
    /// Create a new request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Add a message to the request, empty contents are skipped
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.messages.push(OpenAIMessage {
                role: role.into(),
                content,
            });
        }
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum output length
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

impl From<&GenerationRequest> for OpenAIRequest {
    fn from(request: &GenerationRequest) -> Self {
        OpenAIRequest::new(&request.model)
            .add_message("system", &request.system_prompt)
            .add_message("user", &request.user_prompt)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
    }
}

impl OpenAI {
    /// Create a new client from the service configuration
    pub fn new_with_config(config: &ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            api_key: config.api_key.clone(),
            endpoint: config.api_base.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_ms,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Complete a chat request with retry logic
    pub async fn complete(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let mut attempt = 0;

        loop {
            let result = self.send_once(request).await;
            match result {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    error!("Model API error: {} - attempt {}/{}", e, attempt, self.max_retries + 1);
                    let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, request: &OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let response = self.client.post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(error_text),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(error_text),
                _ => ProviderError::ApiError {
                    status_code: status.as_u16(),
                    message: error_text,
                },
            });
        }

        response.json::<OpenAIResponse>().await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    /// Extract text from a completion response
    pub fn extract_text(response: &OpenAIResponse) -> Result<String, ProviderError> {
        response.choices.first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| ProviderError::ParseError("response contained no choices".to_string()))
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let start = Instant::now();
        let response = self.complete(&OpenAIRequest::from(&request)).await?;
        let text = Self::extract_text(&response)?;

        debug!("{} call on {} finished in {:.2}s", request.purpose, request.model, start.elapsed().as_secs_f64());

        Ok(GenerationResponse {
            text,
            prompt_tokens: response.usage.as_ref().map(|u| u.prompt_tokens as u64),
            completion_tokens: response.usage.as_ref().map(|u| u.completion_tokens as u64),
        })
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
