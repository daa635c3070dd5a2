//! Provider trait for abstracting the generative model backend.

use serde::{Deserialize, Serialize};

use crate::prompt::AdvisoryPrompt;

/// Content block of a backend reply, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderContentBlock {
    /// Text content
    Text { text: String },
    /// The model declined to answer
    Refusal { refusal: String },
}

/// Token usage, when the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Normalized reply from any backend response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<ProviderContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ProviderUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Generation stopped before the answer was complete.
    pub truncated: bool,
}

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

/// Generative model backend
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Current model
    fn model(&self) -> &str;

    /// Send one system + user exchange and normalize the reply.
    async fn send_prompt(&self, prompt: &AdvisoryPrompt) -> Result<ProviderResponse, ProviderError>;
}

/// Concatenate all textual blocks of a response, in emission order.
///
/// Blocks are trimmed and blank blocks skipped; the result is empty when the
/// response carried no text at all.
pub fn extract_all_text(response: &ProviderResponse) -> String {
    response
        .content
        .iter()
        .map(|block| match block {
            ProviderContentBlock::Text { text } => text.trim(),
            ProviderContentBlock::Refusal { refusal } => refusal.trim(),
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
