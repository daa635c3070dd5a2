//! OpenAI Responses API client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cadet_core::head_chars;

use crate::prompt::AdvisoryPrompt;
use crate::providers::provider::{
    Provider, ProviderContentBlock, ProviderError, ProviderResponse, ProviderUsage,
};

const PROVIDER_NAME: &str = "openai";

/// Finish/stop reasons that mean the output budget ran out.
const LENGTH_REASONS: &[&str] = &["length", "max_tokens", "max_output_tokens"];

/// OpenAI Responses API client.
#[derive(Clone)]
pub struct OpenAiResponsesClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_output_tokens: u32,
    temperature: Option<f32>,
}

/// Request body for the Responses API
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Every field is optional: the backend has shipped several response shapes.
#[derive(Debug, Default, Deserialize)]
struct ResponsesApiResponse {
    id: Option<String>,
    model: Option<String>,
    status: Option<String>,
    incomplete: Option<bool>,
    incomplete_details: Option<IncompleteDetails>,
    /// Convenience concatenation of all output text
    output_text: Option<String>,
    output: Option<Vec<OutputItem>>,
    /// Chat Completions style payloads
    choices: Option<Vec<Choice>>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct IncompleteDetails {
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    status: Option<String>,
    content: Option<Vec<OutputContent>>,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<String>,
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(alias = "prompt_tokens")]
    input_tokens: Option<u32>,
    #[serde(alias = "completion_tokens")]
    output_tokens: Option<u32>,
}

impl OpenAiResponsesClient {
    /// Create a new Responses API client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
            max_output_tokens: 700,
            temperature: None,
        })
    }

    /// Set the output token budget
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Send a sampling temperature (omitted by default; some models reject it)
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn responses_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/responses", base)
        } else {
            format!("{}/v1/responses", base)
        }
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key);
        if let Ok(header_value) = HeaderValue::from_str(&auth_value) {
            headers.insert(AUTHORIZATION, header_value);
        }
        headers
    }

    fn build_request<'a>(&'a self, prompt: &'a AdvisoryPrompt) -> ResponsesRequest<'a> {
        ResponsesRequest {
            model: &self.model,
            input: vec![
                InputMessage {
                    role: "system",
                    content: prompt.system,
                },
                InputMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }
}

/// Normalize a raw backend payload.
///
/// Text priority: the non-blank `output_text` convenience field, then every
/// textual segment of `output[].content[]` in order, then a Chat Completions
/// `choices[0].message.content`. Fails only when the payload is not a JSON
/// object or a known field has the wrong type.
pub fn normalize_response(raw: Value) -> Result<ProviderResponse, ProviderError> {
    if !raw.is_object() {
        return Err(ProviderError::InvalidFormat(
            "response body is not a JSON object".to_string(),
        ));
    }
    let response: ResponsesApiResponse = serde_json::from_value(raw)
        .map_err(|e| ProviderError::InvalidFormat(format!("unexpected response shape: {e}")))?;
    Ok(convert_response(response))
}

fn convert_response(response: ResponsesApiResponse) -> ProviderResponse {
    let truncated = is_truncated(&response);
    let stop_reason = response
        .incomplete_details
        .as_ref()
        .and_then(|details| details.reason.clone())
        .or_else(|| {
            response
                .choices
                .as_ref()
                .and_then(|choices| choices.first())
                .and_then(|choice| choice.finish_reason.clone())
        })
        .or_else(|| response.status.clone());

    let content = match response.output_text {
        Some(text) if !text.trim().is_empty() => vec![ProviderContentBlock::Text {
            text: text.trim().to_string(),
        }],
        _ => {
            let segments = output_segments(response.output.unwrap_or_default());
            if segments.is_empty() {
                choice_text(response.choices.unwrap_or_default())
            } else {
                segments
            }
        }
    };

    ProviderResponse {
        id: response.id.unwrap_or_default(),
        model: response.model.unwrap_or_default(),
        content,
        usage: response.usage.map(|u| ProviderUsage {
            input_tokens: u.input_tokens.unwrap_or(0),
            output_tokens: u.output_tokens.unwrap_or(0),
        }),
        stop_reason,
        truncated,
    }
}

fn output_segments(output: Vec<OutputItem>) -> Vec<ProviderContentBlock> {
    output
        .into_iter()
        .flat_map(|item| item.content.unwrap_or_default())
        .filter_map(|segment| match segment.kind.as_deref() {
            Some("output_text") | Some("text") => segment
                .text
                .filter(|text| !text.trim().is_empty())
                .map(|text| ProviderContentBlock::Text { text }),
            Some("refusal") => segment
                .refusal
                .filter(|refusal| !refusal.trim().is_empty())
                .map(|refusal| ProviderContentBlock::Refusal { refusal }),
            _ => None,
        })
        .collect()
}

fn choice_text(choices: Vec<Choice>) -> Vec<ProviderContentBlock> {
    choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|text| !text.trim().is_empty())
        .map(|text| vec![ProviderContentBlock::Text { text }])
        .unwrap_or_default()
}

fn is_truncated(response: &ResponsesApiResponse) -> bool {
    let is_length_reason = |reason: &str| LENGTH_REASONS.contains(&reason);

    response.incomplete == Some(true)
        || response.status.as_deref() == Some("incomplete")
        || response.incomplete_details.is_some()
        || response
            .output
            .iter()
            .flatten()
            .any(|item| item.status.as_deref() == Some("incomplete"))
        || response
            .choices
            .iter()
            .flatten()
            .filter_map(|choice| choice.finish_reason.as_deref())
            .any(is_length_reason)
}

#[async_trait::async_trait]
impl Provider for OpenAiResponsesClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send_prompt(&self, prompt: &AdvisoryPrompt) -> Result<ProviderResponse, ProviderError> {
        let request_body = self.build_request(prompt);

        let response = self
            .http_client
            .post(self.responses_url())
            .headers(self.build_headers())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: response_text,
            });
        }

        let raw: Value = serde_json::from_str(&response_text).map_err(|e| {
            let preview = head_chars(&response_text, 500);
            ProviderError::InvalidFormat(format!(
                "Failed to parse Responses API payload: {e}\nBody preview: {preview}"
            ))
        })?;
        normalize_response(raw)
    }
}
