//! Text-generation providers.
//!
//! Every model call in the workspace goes through [`LlmProvider`]. The row
//! pipeline and translator hold an `Arc<dyn LlmProvider>` and never see HTTP.
//!
//! ## Security
//!
//! Providers keep their keys in [`ApiCredential`], which redacts itself in
//! `Debug` and `Display`.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

mod factory;
pub mod secrets;

#[cfg(feature = "gemini")]
mod gemini;

pub use factory::{ProviderFactory, ProviderRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiProvider, GeminiProviderFactory, GEMINI_API_KEY_ENV, GEMINI_DEFAULT_ENDPOINT};

/// Errors from model providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Per-call settings.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Model identifier, e.g. `gemini-2.5-pro`
    pub model: String,

    /// Request timeout
    pub timeout: Duration,
}

impl CompletionConfig {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            model: model.into(),
            timeout,
        }
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text, trimmed
    pub content: String,

    pub usage: TokenUsage,

    /// Model that answered
    pub model: String,

    pub finish_reason: Option<String>,
}

/// Token usage reported by the service.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    /// Total tokens used.
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A hosted text-generation backend: one prompt in, one text out.
///
/// Implementations make exactly one request per call. Callers decide what a
/// failure means for their row.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a single prompt.
    async fn complete(
        &self,
        prompt: &str,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
