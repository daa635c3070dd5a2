use std::time::Duration;

use cadet_core::{
    AdvisoryReply, AdvisoryRequest, ChatErrorBody, ChatReplyBody, ClientSettings, head_chars,
};
use tracing::{debug, warn};

/// Longest upstream error text kept for diagnostics.
const MAX_DETAIL_CHARS: usize = 900;

/// Classified failure of one remote advisory attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// Gateway has no backend credential (HTTP 501).
    #[error("AI not configured")]
    Configuration,
    /// Any other non-2xx status, or a 2xx body that is not a chat reply.
    #[error("upstream error ({status}): {details}")]
    Upstream { status: u16, details: String },
    /// Transport failure or timeout.
    #[error("network error: {0}")]
    Network(String),
}

impl ChannelError {
    /// Short failure class for availability hints.
    pub fn class(&self) -> &'static str {
        match self {
            ChannelError::Configuration => "not configured",
            ChannelError::Upstream { .. } => "upstream error",
            ChannelError::Network(_) => "network error",
        }
    }
}

/// Remote side of the advisory pipeline.
#[async_trait::async_trait]
pub trait AdvisoryChannel: Send + Sync {
    /// One content call.
    async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryReply, ChannelError>;

    /// Reach the advisory route without a content call; returns the HTTP status.
    async fn probe(&self) -> Result<u16, ChannelError>;
}

/// HTTP client for the gateway's chat route.
#[derive(Clone)]
pub struct GatewayClient {
    http_client: reqwest::Client,
    url: String,
}

impl GatewayClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ChannelError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelError::Network(e.to_string()))?;
        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ChannelError> {
        Self::new(
            settings.gateway_url.clone(),
            Duration::from_secs(settings.timeout_seconds),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl AdvisoryChannel for GatewayClient {
    async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryReply, ChannelError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;

        if status.as_u16() == 501 {
            return Err(ChannelError::Configuration);
        }
        if !status.is_success() {
            let details = match serde_json::from_str::<ChatErrorBody>(&text) {
                Ok(body) => match body.details {
                    Some(details) => format!("{}: {}", body.error, details),
                    None => body.error,
                },
                Err(_) => text,
            };
            let details = head_chars(&details, MAX_DETAIL_CHARS).to_string();
            warn!(status = status.as_u16(), "Gateway returned an error");
            return Err(ChannelError::Upstream {
                status: status.as_u16(),
                details,
            });
        }

        let body: ChatReplyBody =
            serde_json::from_str(&text).map_err(|e| ChannelError::Upstream {
                status: status.as_u16(),
                details: format!("malformed reply: {e}"),
            })?;
        Ok(AdvisoryReply::remote(body.reply, body.truncated))
    }

    async fn probe(&self) -> Result<u16, ChannelError> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ChannelError::Network(e.to_string()))?;
        debug!(status = response.status().as_u16(), "Availability probe answered");
        Ok(response.status().as_u16())
    }
}
