//! Advisory request handling shared by every transport.
//!
//! `AdvisoryService` validates the raw chat payload, applies input limits,
//! builds the prompt and maps backend failures onto [`RemoteError`].

use std::sync::Arc;

use cadet_core::{
    AdvisoryMode, AdvisoryReply, AdvisoryRequest, ChatErrorBody, ChatReplyBody, ChatRequestBody,
    LimitSettings, head_chars, tail_chars,
};
use tracing::{error, info, warn};

use crate::prompt::AdvisoryPrompt;
use crate::providers::{Provider, ProviderError, extract_all_text};

/// Reply text when the backend answered without any text.
pub const NO_REPLY: &str = "No reply.";

/// Failures of one advisory call, as reported on the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Invalid JSON")]
    InvalidJson,
    #[error("Message required")]
    EmptyMessage,
    #[error("OPENAI_API_KEY not set")]
    NotConfigured,
    #[error("Upstream error")]
    Upstream { status: u16, details: String },
    #[error("Malformed upstream response")]
    MalformedUpstream { details: String },
    #[error("Network error")]
    Network { details: String },
}

impl RemoteError {
    /// HTTP status the gateway answers with.
    pub fn http_status(&self) -> u16 {
        match self {
            RemoteError::MethodNotAllowed => 405,
            RemoteError::InvalidJson | RemoteError::EmptyMessage => 400,
            RemoteError::NotConfigured => 501,
            RemoteError::Upstream { .. }
            | RemoteError::MalformedUpstream { .. }
            | RemoteError::Network { .. } => 502,
        }
    }

    pub fn to_body(&self) -> ChatErrorBody {
        let (status, details) = match self {
            RemoteError::Upstream { status, details } => (Some(*status), Some(details.clone())),
            RemoteError::MalformedUpstream { details } | RemoteError::Network { details } => {
                (None, Some(details.clone()))
            }
            _ => (None, None),
        };
        ChatErrorBody {
            error: self.to_string(),
            status,
            details,
        }
    }
}

/// Server-side proxy to the generative backend.
#[derive(Clone)]
pub struct AdvisoryService {
    provider: Option<Arc<dyn Provider>>,
    limits: LimitSettings,
}

impl AdvisoryService {
    /// `provider` is `None` when no backend credential is configured.
    pub fn new(provider: Option<Arc<dyn Provider>>, limits: LimitSettings) -> Self {
        Self { provider, limits }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Parse and sanitize a raw request body. An empty body reads as `{}`.
    pub fn parse_request(&self, body: &[u8]) -> Result<AdvisoryRequest, RemoteError> {
        let payload: ChatRequestBody = if body.iter().all(u8::is_ascii_whitespace) {
            ChatRequestBody::default()
        } else {
            serde_json::from_slice(body).map_err(|_| RemoteError::InvalidJson)?
        };
        self.sanitize(payload)
    }

    /// Apply the input limits to a decoded payload.
    pub fn sanitize(&self, payload: ChatRequestBody) -> Result<AdvisoryRequest, RemoteError> {
        let message = head_chars(payload.message.trim(), self.limits.max_message_chars);
        if message.is_empty() {
            return Err(RemoteError::EmptyMessage);
        }

        let prior = tail_chars(payload.prior.trim(), self.limits.max_prior_chars);
        match payload.mode {
            AdvisoryMode::Answer => Ok(AdvisoryRequest::answer(message)),
            AdvisoryMode::Continue if prior.is_empty() => Err(RemoteError::EmptyMessage),
            AdvisoryMode::Continue => Ok(AdvisoryRequest {
                message: message.to_string(),
                mode: AdvisoryMode::Continue,
                prior_context: prior.to_string(),
            }),
        }
    }

    /// Forward one sanitized request to the backend.
    pub async fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryReply, RemoteError> {
        let Some(provider) = self.provider.as_ref() else {
            return Err(RemoteError::NotConfigured);
        };

        info!(
            provider = provider.name(),
            model = provider.model(),
            mode = %request.mode,
            "chat invoked"
        );

        let prompt = match request.mode {
            AdvisoryMode::Answer => AdvisoryPrompt::answer(&request.message),
            AdvisoryMode::Continue => AdvisoryPrompt::continuation(&request.prior_context),
        };

        let response = provider
            .send_prompt(&prompt)
            .await
            .map_err(|e| self.classify(e))?;

        let (input_tokens, output_tokens) = response
            .usage
            .as_ref()
            .map(|usage| (usage.input_tokens, usage.output_tokens))
            .unwrap_or_default();
        info!(
            response_id = %response.id,
            model = %response.model,
            stop_reason = response.stop_reason.as_deref().unwrap_or("none"),
            input_tokens,
            output_tokens,
            truncated = response.truncated,
            "chat completed"
        );

        let text = extract_all_text(&response);
        if text.is_empty() {
            warn!(model = provider.model(), "backend returned no text");
            return Ok(AdvisoryReply::remote(NO_REPLY, response.truncated));
        }
        Ok(AdvisoryReply::remote(text, response.truncated))
    }

    /// Full request path: parse, then advise.
    pub async fn handle(&self, body: &[u8]) -> Result<ChatReplyBody, RemoteError> {
        let request = self.parse_request(body)?;
        let reply = self.advise(&request).await?;
        Ok(ChatReplyBody {
            reply: reply.text,
            truncated: reply.truncated,
        })
    }

    fn classify(&self, err: ProviderError) -> RemoteError {
        let cap = self.limits.max_detail_chars;
        match err {
            ProviderError::ApiError { status, message } => {
                let details = head_chars(&message, cap).to_string();
                error!(status, details = %details, "Upstream error");
                RemoteError::Upstream { status, details }
            }
            ProviderError::HttpError(e) => {
                let details = head_chars(&e.to_string(), cap).to_string();
                error!(details = %details, "Network error");
                RemoteError::Network { details }
            }
            ProviderError::Serialization(e) => {
                let details = head_chars(&e.to_string(), cap).to_string();
                error!(details = %details, "Malformed upstream response");
                RemoteError::MalformedUpstream { details }
            }
            ProviderError::InvalidFormat(message) => {
                let details = head_chars(&message, cap).to_string();
                error!(details = %details, "Malformed upstream response");
                RemoteError::MalformedUpstream { details }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::providers::{ProviderContentBlock, ProviderResponse, ProviderUsage};
    use std::sync::Mutex;

    /// Provider double that records prompts and replays a canned result.
    pub(crate) struct FakeProvider {
        pub(crate) prompts: Mutex<Vec<AdvisoryPrompt>>,
        result: Box<dyn Fn() -> Result<ProviderResponse, ProviderError> + Send + Sync>,
    }

    impl FakeProvider {
        pub(crate) fn replying(text: &str, truncated: bool) -> Arc<Self> {
            let text = text.to_string();
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                result: Box::new(move || {
                    Ok(ProviderResponse {
                        id: "resp_test".to_string(),
                        model: "fake-model".to_string(),
                        content: vec![ProviderContentBlock::Text { text: text.clone() }],
                        usage: None,
                        stop_reason: None,
                        truncated,
                    })
                }),
            })
        }

        pub(crate) fn responding(response: ProviderResponse) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                result: Box::new(move || Ok(response.clone())),
            })
        }

        pub(crate) fn failing(
            make: impl Fn() -> ProviderError + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                result: Box::new(move || Err(make())),
            })
        }

        pub(crate) fn recorded(&self) -> Vec<AdvisoryPrompt> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Provider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-model"
        }

        async fn send_prompt(
            &self,
            prompt: &AdvisoryPrompt,
        ) -> Result<ProviderResponse, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            (self.result)()
        }
    }

    fn service(provider: Arc<FakeProvider>) -> AdvisoryService {
        AdvisoryService::new(Some(provider), LimitSettings::default())
    }

    #[test]
    fn test_empty_body_reads_as_empty_object() {
        let service = AdvisoryService::new(None, LimitSettings::default());
        assert_eq!(service.parse_request(b""), Err(RemoteError::EmptyMessage));
        assert_eq!(service.parse_request(b"  \n"), Err(RemoteError::EmptyMessage));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let service = AdvisoryService::new(None, LimitSettings::default());
        assert_eq!(
            service.parse_request(b"{not json"),
            Err(RemoteError::InvalidJson)
        );
        assert_eq!(
            service.parse_request(br#"{"message": 42}"#),
            Err(RemoteError::InvalidJson)
        );
    }

    #[test]
    fn test_whitespace_message_is_rejected() {
        let service = AdvisoryService::new(None, LimitSettings::default());
        assert_eq!(
            service.parse_request(br#"{"message":"   "}"#),
            Err(RemoteError::EmptyMessage)
        );
    }

    #[test]
    fn test_message_at_limit_is_forwarded_unmodified() {
        let service = AdvisoryService::new(None, LimitSettings::default());
        let exact = "é".repeat(2000);
        let request = service
            .sanitize(ChatRequestBody {
                message: exact.clone(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(request.message, exact);

        let over = format!("{}x", exact);
        let request = service
            .sanitize(ChatRequestBody {
                message: over,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(request.message.chars().count(), 2000);
        assert_eq!(request.message, exact);
    }

    #[test]
    fn test_prior_keeps_tail() {
        let service = AdvisoryService::new(None, LimitSettings::default());
        let prior = format!("{}{}", "a".repeat(100), "b".repeat(12000));
        let request = service
            .sanitize(ChatRequestBody {
                message: "continue".to_string(),
                mode: AdvisoryMode::Continue,
                prior,
            })
            .unwrap();
        assert_eq!(request.prior_context, "b".repeat(12000));
    }

    #[test]
    fn test_continue_without_prior_is_rejected() {
        let service = AdvisoryService::new(None, LimitSettings::default());
        let result = service.sanitize(ChatRequestBody {
            message: "continue".to_string(),
            mode: AdvisoryMode::Continue,
            prior: String::new(),
        });
        assert_eq!(result, Err(RemoteError::EmptyMessage));
    }

    #[tokio::test]
    async fn test_unconfigured_service() {
        let service = AdvisoryService::new(None, LimitSettings::default());
        assert!(!service.is_configured());
        assert_eq!(
            service.handle(br#"{"message":"hi"}"#).await,
            Err(RemoteError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_input_errors_win_over_missing_key() {
        let service = AdvisoryService::new(None, LimitSettings::default());
        assert_eq!(service.handle(b"nope").await, Err(RemoteError::InvalidJson));
    }

    #[tokio::test]
    async fn test_answer_uses_preamble_and_message() {
        let provider = FakeProvider::replying("Start with PSAT prep.", false);
        let service = service(provider.clone());

        let reply = service
            .handle(br#"{"message":"  What should a 10th grader do?  "}"#)
            .await
            .unwrap();
        assert_eq!(reply.reply, "Start with PSAT prep.");
        assert!(!reply.truncated);

        let prompts = provider.recorded();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0], AdvisoryPrompt::answer("What should a 10th grader do?"));
    }

    #[tokio::test]
    async fn test_continuation_quotes_prior() {
        let provider = FakeProvider::replying("and the rest.", true);
        let service = service(provider.clone());

        let reply = service
            .handle(br#"{"message":"continue","mode":"continue","prior":"Step 1"}"#)
            .await
            .unwrap();
        assert!(reply.truncated);
        assert_eq!(provider.recorded()[0], AdvisoryPrompt::continuation("Step 1"));
    }

    #[tokio::test]
    async fn test_blank_backend_reply_uses_sentinel() {
        let service = service(FakeProvider::replying("   ", false));
        let reply = service.handle(br#"{"message":"hi"}"#).await.unwrap();
        assert_eq!(reply.reply, NO_REPLY);
    }

    /// Captures formatted log output for one test.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_completion_is_logged_with_usage_and_stop_reason() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let service = service(FakeProvider::responding(ProviderResponse {
            id: "resp_42".to_string(),
            model: "gpt-5-mini-2025".to_string(),
            content: vec![ProviderContentBlock::Text {
                text: "Step 1".to_string(),
            }],
            usage: Some(ProviderUsage {
                input_tokens: 120,
                output_tokens: 700,
            }),
            stop_reason: Some("max_output_tokens".to_string()),
            truncated: true,
        }));
        service
            .handle(br#"{"message":"my SSN is 123-45-6789"}"#)
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("chat invoked"));
        assert!(output.contains("fake"));
        assert!(output.contains("chat completed"));
        assert!(output.contains("resp_42"));
        assert!(output.contains("gpt-5-mini-2025"));
        assert!(output.contains("max_output_tokens"));
        assert!(output.contains("input_tokens=120"));
        assert!(output.contains("output_tokens=700"));
        assert!(!output.contains("123-45-6789"));
    }

    #[tokio::test]
    async fn test_upstream_details_are_capped() {
        let service = service(FakeProvider::failing(|| ProviderError::ApiError {
            status: 429,
            message: "x".repeat(5000),
        }));

        let err = service.handle(br#"{"message":"hi"}"#).await.unwrap_err();
        assert_eq!(err.http_status(), 502);
        let body = err.to_body();
        assert_eq!(body.error, "Upstream error");
        assert_eq!(body.status, Some(429));
        assert_eq!(body.details.map(|d| d.chars().count()), Some(900));
    }

    #[tokio::test]
    async fn test_malformed_backend_payload() {
        let service = service(FakeProvider::failing(|| {
            ProviderError::InvalidFormat("response body is not a JSON object".to_string())
        }));

        let err = service.handle(br#"{"message":"hi"}"#).await.unwrap_err();
        assert!(matches!(err, RemoteError::MalformedUpstream { .. }));
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(RemoteError::MethodNotAllowed.http_status(), 405);
        assert_eq!(RemoteError::InvalidJson.http_status(), 400);
        assert_eq!(RemoteError::EmptyMessage.http_status(), 400);
        assert_eq!(RemoteError::NotConfigured.http_status(), 501);
        assert_eq!(
            RemoteError::Network {
                details: "timeout".to_string()
            }
            .http_status(),
            502
        );
    }
}
