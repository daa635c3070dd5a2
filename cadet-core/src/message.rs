//! Wire types shared by the advisory gateway and its clients.

use serde::{Deserialize, Serialize};

/// Whether the gateway answers a fresh question or resumes a cut-off answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryMode {
    #[default]
    Answer,
    Continue,
}

impl AdvisoryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryMode::Answer => "answer",
            AdvisoryMode::Continue => "continue",
        }
    }
}

impl std::fmt::Display for AdvisoryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which channel produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceChannel {
    Remote,
    Local,
}

/// A resolved answer for one advisory turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryReply {
    pub text: String,
    pub truncated: bool,
    pub source_channel: SourceChannel,
}

impl AdvisoryReply {
    pub fn remote(text: impl Into<String>, truncated: bool) -> Self {
        Self {
            text: text.into(),
            truncated,
            source_channel: SourceChannel::Remote,
        }
    }

    /// Local replies are complete by construction.
    pub fn local(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            truncated: false,
            source_channel: SourceChannel::Local,
        }
    }
}

/// One advisory call, after input limits have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRequest {
    pub message: String,
    pub mode: AdvisoryMode,
    /// Tail of the answer being continued; empty in answer mode.
    pub prior_context: String,
}

impl AdvisoryRequest {
    pub fn answer(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            mode: AdvisoryMode::Answer,
            prior_context: String::new(),
        }
    }

    pub fn continuation(prior_context: impl Into<String>) -> Self {
        Self {
            message: "continue".to_string(),
            mode: AdvisoryMode::Continue,
            prior_context: prior_context.into(),
        }
    }

    pub fn to_body(&self) -> ChatRequestBody {
        ChatRequestBody {
            message: self.message.clone(),
            mode: self.mode,
            prior: self.prior_context.clone(),
        }
    }
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequestBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub mode: AdvisoryMode,
    #[serde(default)]
    pub prior: String,
}

/// Success body for `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReplyBody {
    pub reply: String,
    #[serde(default)]
    pub truncated: bool,
}

/// Error body for every non-200 gateway response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatErrorBody {
    pub error: String,
    /// Upstream HTTP status, when the backend answered with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
