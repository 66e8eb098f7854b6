//! Amazon Bedrock provider over the Converse API.
//!
//! Sends `POST {endpoint}/model/{modelId}/converse` with a bearer token and
//! maps the reply onto the core Provider contract:
//! - system messages are hoisted into the `system` block
//! - decoding parameters go into `inferenceConfig`
//! - the guardrail policy goes into `guardrailConfig`
//! - `stopReason: guardrail_intervened` or `content_filtered` becomes a distinct error
//!
//! Responses are always requested as one complete unit (no streaming).

use async_trait::async_trait;
use finsight_core::error::ProviderError;
use finsight_core::message::{Message, Role};
use finsight_core::provider::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// A Bedrock Converse provider.
pub struct BedrockProvider {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl BedrockProvider {
    /// Create a provider against an explicit runtime endpoint.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Create a provider for the regional runtime endpoint.
    pub fn for_region(region: &str, api_key: Option<String>) -> Result<Self, ProviderError> {
        Self::new(format!("https://bedrock-runtime.{region}.amazonaws.com"), api_key)
    }

    fn converse_url(&self, model: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::NotConfigured(format!("Invalid endpoint {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::NotConfigured(format!("Endpoint cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["model", model, "converse"]);
        Ok(url)
    }

    /// Convert a core request to the Converse wire format.
    ///
    /// Converse rejects consecutive messages with the same role, so adjacent
    /// same-role messages are merged into one message with several text blocks.
    fn to_api_body(request: &ProviderRequest) -> ConverseRequest {
        let system: Vec<ApiContent> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| ApiContent::text(&m.content))
            .collect();

        let mut messages: Vec<ApiMessage> = Vec::new();
        for m in request.messages.iter().filter(|m| m.role != Role::System) {
            let role = match m.role {
                Role::Assistant => "assistant",
                _ => "user",
            };
            match messages.last_mut() {
                Some(last) if last.role == role => last.content.push(ApiContent::text(&m.content)),
                _ => messages.push(ApiMessage {
                    role: role.to_string(),
                    content: vec![ApiContent::text(&m.content)],
                }),
            }
        }

        ConverseRequest {
            messages,
            system,
            inference_config: InferenceConfig {
                temperature: request.temperature,
                top_p: request.top_p,
                max_tokens: request.max_tokens,
            },
            guardrail_config: request.guardrail.as_ref().map(|g| ApiGuardrail {
                guardrail_identifier: g.identifier.clone(),
                guardrail_version: g.version.clone(),
                trace: "disabled".into(),
            }),
        }
    }

    fn map_status(status: u16, retry_after: Option<u64>, body: String) -> ProviderError {
        match status {
            429 => ProviderError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(0),
            },
            401 | 403 => ProviderError::AuthenticationFailed(
                "Invalid bearer token or insufficient permissions".into(),
            ),
            408 | 504 => ProviderError::Timeout(format!("Upstream timeout (status {status})")),
            _ => ProviderError::ApiError {
                status_code: status,
                message: body,
            },
        }
    }
}

#[async_trait]
impl Provider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = self.converse_url(&request.model)?;
        let body = Self::to_api_body(&request);

        debug!(
            model = %request.model,
            messages = body.messages.len(),
            guardrail = body.guardrail_config.is_some(),
            "Sending converse request"
        );

        let mut http = self.client.post(url).json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout(e.to_string())
            } else {
                ProviderError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status != 200 {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Converse returned error");
            return Err(Self::map_status(status, retry_after, error_body));
        }

        let api_response: ConverseResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let content = api_response
            .output
            .message
            .map(|m| {
                m.content
                    .into_iter()
                    .filter_map(|c| c.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let stop_reason = StopReason::parse(&api_response.stop_reason);
        if matches!(stop_reason, StopReason::GuardrailIntervened | StopReason::ContentFiltered) {
            warn!(model = %request.model, stop_reason = ?stop_reason, "Guardrail intervened");
            return Err(ProviderError::GuardrailIntervened(content));
        }
        if stop_reason == StopReason::MaxTokens {
            warn!(model = %request.model, "Response truncated at max_tokens");
        }

        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.input_tokens,
            completion_tokens: u.output_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ProviderResponse {
            message: Message::assistant(content),
            usage,
            model: request.model,
            stop_reason,
        })
    }
}

// --- Converse wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseRequest {
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<ApiContent>,
    inference_config: InferenceConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    guardrail_config: Option<ApiGuardrail>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: Vec<ApiContent>,
}

/// A content block. Non-text blocks deserialize with `text: None`.
#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl ApiContent {
    fn text(s: &str) -> Self {
        Self {
            text: Some(s.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGuardrail {
    guardrail_identifier: String,
    guardrail_version: String,
    trace: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseResponse {
    output: ConverseOutput,
    stop_reason: String,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ConverseOutput {
    #[serde(default)]
    message: Option<ApiMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
    total_tokens: u32,
}
