use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::messages::{
    ChatMessage, OllamaChatRequest, OllamaChatResponse, OllamaGenerateRequest,
    OllamaGenerateResponse, OllamaOptions,
};
use crate::config::LlmConfig;

/// Errors returned by a [`CompletionGateway`].
///
/// Generation and scoring treat every variant the same way: log it and switch
/// to the deterministic fallback.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("LLM request timed out")]
    Timeout,

    #[error("LLM returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CompletionError::Timeout
        } else {
            CompletionError::Request(e.to_string())
        }
    }
}

/// What the model is asked: a chat transcript or a single prompt
#[derive(Debug, Clone)]
pub enum CompletionInput {
    Chat(Vec<ChatMessage>),
    Prompt(String),
}

#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Model name; `None` uses the gateway default
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Hard per-call timeout
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub input: CompletionInput,
    pub options: CompletionOptions,
}

/// Chat/prompt completion against a language model.
///
/// Calls are never retried here; callers own the fallback decision.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;

    /// Model used when a request does not name one
    fn default_model(&self) -> &str;
}

/// Talks to a local Ollama server (`/api/chat` and `/api/generate`)
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        info!("Using Ollama at {} (model {})", config.base_url, config.model);

        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<reqwest::Response, CompletionError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionGateway for OllamaClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let CompletionRequest { input, options } = request;
        let model = options.model.as_deref().unwrap_or(&self.model);
        let sampling = OllamaOptions {
            temperature: options.temperature,
            top_p: 0.9,
            num_predict: options.max_tokens,
        };

        let text = match &input {
            CompletionInput::Chat(messages) => {
                debug!("Calling {} via /api/chat ({} messages)", model, messages.len());
                let body = OllamaChatRequest {
                    model,
                    messages,
                    stream: false,
                    options: sampling,
                };
                let response = self.post_json("/api/chat", &body, options.timeout).await?;
                let parsed: OllamaChatResponse = response
                    .json()
                    .await
                    .map_err(|e| CompletionError::Parse(e.to_string()))?;
                parsed.message.map(|m| m.content).unwrap_or_default()
            }
            CompletionInput::Prompt(prompt) => {
                debug!("Calling {} via /api/generate ({} chars)", model, prompt.len());
                let body = OllamaGenerateRequest {
                    model,
                    prompt,
                    stream: false,
                    options: sampling,
                };
                let response = self
                    .post_json("/api/generate", &body, options.timeout)
                    .await?;
                let parsed: OllamaGenerateResponse = response
                    .json()
                    .await
                    .map_err(|e| CompletionError::Parse(e.to_string()))?;
                parsed.response
            }
        };

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }

        info!("LLM completion received: {} characters", text.len());
        Ok(text)
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
