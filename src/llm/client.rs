//! HTTP client for OpenRouter's chat completions endpoint.
//!
//! No loop awareness — just makes API calls via reqwest. The orchestration
//! loop consumes this through the [`LlmClient`] trait so tests can script
//! model behavior without a network.

use async_trait::async_trait;
use reqwest::Client;

use super::types::{AssistantMessage, ChatMessage, ChatRequest, ChatResponse, ToolSchema};

/// Errors from LLM operations. These propagate out of the agent loop
/// unretried; a failing model ends the invocation.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// The model boundary: one request/response round against a chat model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Submit the transcript (plus optional tool declarations) and return
    /// the assistant's next turn.
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> Result<AssistantMessage, LlmError>;
}

/// Client for the OpenRouter chat completions API.
#[derive(Debug)]
pub struct OpenRouterClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterClient {
    /// Create a client with the default base URL (https://openrouter.ai/api/v1).
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://openrouter.ai/api/v1".into())
    }

    /// Create a client with a custom base URL (for testing with mock servers).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> Result<AssistantMessage, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            tools: tools.map(|t| t.to_vec()),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "model usage"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".into()))
    }
}
