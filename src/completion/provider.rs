use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Role of one entry in a chat-completion message list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Hint for reasoning-capable deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
}

/// Generation parameters sent alongside the messages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompletionParams {
    pub max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    #[serde(skip)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Text of the first completion choice plus whatever usage the service reported.
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("completion request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("completion API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("failed to decode completion response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("completion response did not contain message content")]
    EmptyResponse,
}

/// The one capability the tools need from a chat-completion service.
pub trait ChatCompletion {
    fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<Completion, ProviderError>;
}

impl<T: ChatCompletion + ?Sized> ChatCompletion for &T {
    fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<Completion, ProviderError> {
        (**self).complete(messages, params)
    }
}
