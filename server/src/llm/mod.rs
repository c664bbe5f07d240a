//! LLM: multi-provider adapter for command parsing and place ranking.
//!
//! DESIGN
//! ======
//! Uses environment variables for configuration. The `LlmClient` dispatches
//! to Anthropic or `OpenAI` based on `LLM_PROVIDER`. Callers go through the
//! [`LlmChat`] trait and usually through [`json::complete_json`], which
//! asks for a JSON reply and decodes it.

pub mod anthropic;
pub mod config;
mod http;
pub mod json;
pub mod openai;
pub mod types;

use std::time::Duration;

use config::{LlmConfig, LlmProviderKind};
use tracing::warn;
pub use json::complete_json;
pub use types::{ChatResponse, LlmChat, LlmError, Message};

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// One retry for transient provider failures.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Concrete LLM client that dispatches to either Anthropic or `OpenAI`.
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
    max_tokens: u32,
}

enum LlmProvider {
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables (see [`LlmConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let model = config.model.clone();
        let max_tokens = config.max_tokens;
        let inner = match config.provider {
            LlmProviderKind::Anthropic => {
                LlmProvider::Anthropic(anthropic::AnthropicClient::new(config.api_key, config.timeouts)?)
            }
            LlmProviderKind::OpenAi => LlmProvider::OpenAi(openai::OpenAiClient::new(
                config.api_key,
                config.openai_mode,
                config.openai_base_url,
                config.timeouts,
            )?),
        };
        Ok(Self { inner, model, max_tokens })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        match &self.inner {
            LlmProvider::Anthropic(c) => c.chat(&self.model, max_tokens, system, messages).await,
            LlmProvider::OpenAi(c) => c.chat(&self.model, max_tokens, system, messages).await,
        }
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    /// `max_tokens` is capped at the configured `LLM_MAX_TOKENS`.
    async fn chat(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        let max_tokens = max_tokens.min(self.max_tokens);
        match self.send(max_tokens, system, messages).await {
            Err(e) if e.retryable() => {
                warn!(error = %e, model = %self.model, "llm: transient failure, retrying once");
                tokio::time::sleep(RETRY_DELAY).await;
                self.send(max_tokens, system, messages).await
            }
            result => result,
        }
    }
}
