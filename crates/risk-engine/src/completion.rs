//! Chat-completion client
//!
//! One request per generation, no retries, no streaming. The reply's first
//! choice is returned verbatim (trimmed); a reply without choices becomes
//! `Error in response: ...` text that is shown in place of the template.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::CompletionError;
use crate::prompt::SYSTEM_MESSAGE;

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Model parameters sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat-completions request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

impl ChatRequest {
    /// System/user message pair for a risk template prompt
    pub fn for_prompt(prompt: String, settings: &CompletionSettings) -> Self {
        Self {
            model: settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_MESSAGE.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: settings.temperature,
        }
    }

    /// The user prompt, if present
    pub fn user_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
    }
}

/// External text-completion service
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Service identifier for logs
    fn name(&self) -> &'static str;

    /// Send one request and return the template text
    async fn complete(&self, request: &ChatRequest) -> Result<String, CompletionError>;
}

/// OpenAI-compatible chat-completions client
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout_ms: u64,
}

impl OpenAiClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout_ms: u64,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout_ms,
        })
    }

    /// True when an API key is available
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, CompletionError> {
        let api_key = self.api_key.as_deref().ok_or(CompletionError::MissingApiKey)?;

        info!(
            "Completion request: model={}, endpoint={}",
            request.model, self.endpoint
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        debug!("Completion response: status={}, {} bytes", status, body.len());
        if !status.is_success() {
            warn!("Completion service returned {}", status);
        }

        Ok(completion_text_from_body(&body))
    }
}

impl OpenAiClient {
    fn transport_error(&self, err: reqwest::Error) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout(self.timeout_ms)
        } else {
            CompletionError::Http(err.to_string())
        }
    }
}

/// Pull the template text out of a raw completion response body.
///
/// Returns the first choice's message content, trimmed. Any other shape
/// (error object, empty choices, non-JSON) becomes `Error in response: ...`
/// carrying the raw response.
pub fn completion_text_from_body(body: &str) -> String {
    let json: Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(_) => return format!("Error in response: {}", body),
    };

    let content = json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str());

    match content {
        Some(text) => text.trim().to_string(),
        None => format!("Error in response: {}", json),
    }
}
