use crate::error::{Result, SessionError};
use crate::transcript::Turn;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The public OpenAI endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// The chat model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Sampling settings for a single completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerationParams {
    /// Settings for in-character replies, tuned for variety.
    pub const REPLY: Self = Self {
        max_tokens: 500,
        temperature: 0.9,
    };

    /// Settings for the numeric rating, tuned for consistency.
    pub const SCORING: Self = Self {
        max_tokens: 10,
        temperature: 0.3,
    };
}

/// A generic client for a chat-completion backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Sends `messages` in order and returns the text of the first choice.
    async fn complete(&self, messages: Vec<Turn>, params: GenerationParams) -> Result<String>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extracts `choices[0].message.content` from a completion body.
pub fn parse_completion(body: &str) -> Result<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| SessionError::MalformedResponse(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| SessionError::MalformedResponse("response has no choices".to_string()))?
        .message
        .content
        .ok_or_else(|| {
            SessionError::MalformedResponse("first choice has no message content".to_string())
        })
}

/// An implementation of `LLMClient` for any OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleClient {
    http: reqwest::Client,
    api_key: SecretString,
    model: String,
    api_base: String,
}

impl OpenAICompatibleClient {
    /// Creates a client for the public OpenAI endpoint.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer token sent with every request. Never logged.
    /// * `model` - The model identifier for chat completions (e.g., "gpt-4o-mini").
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_api_base(api_key, model, DEFAULT_API_BASE)
    }

    /// Creates a client for a custom OpenAI-compatible base URL.
    pub fn with_api_base(
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: SecretString::from(api_key.into()),
            model: model.into(),
            api_base: api_base.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn complete(&self, messages: Vec<Turn>, params: GenerationParams) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: &messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        debug!(
            model = %self.model,
            messages = messages.len(),
            max_tokens = params.max_tokens,
            "Sending chat completion request"
        );
        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SessionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion(&body)
    }
}
