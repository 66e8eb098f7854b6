//! Provider trait: the abstraction over the hosted LLM endpoint.
//!
//! A Provider sends an assembled prompt to the model and returns the complete
//! generated message. Responses are never streamed: the orchestration layer
//! needs the whole answer before it can record history and render HTML.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::Message;

/// Guardrail policy applied by the endpoint to input and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Guardrail identifier
    pub identifier: String,

    /// Guardrail version (e.g. "1" or "DRAFT")
    pub version: String,
}

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "amazon.nova-pro-v1:0")
    pub model: String,

    /// The prompt messages; system messages are hoisted by the provider
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus-sampling threshold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Content guardrail to enforce
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardrail: Option<GuardrailConfig>,
}

fn default_temperature() -> f32 {
    0.2
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    GuardrailIntervened,
    ContentFiltered,
    Other(String),
}

impl StopReason {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "end_turn" => StopReason::EndTurn,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "guardrail_intervened" => StopReason::GuardrailIntervened,
            "content_filtered" => StopReason::ContentFiltered,
            other => StopReason::Other(other.to_string()),
        }
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated message
    pub message: Message,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model responded
    pub model: String,

    /// Why generation ended
    pub stop_reason: StopReason,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Guardrail refusals are reported as [`ProviderError::GuardrailIntervened`],
/// never as an `Ok` response carrying the refusal text.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "bedrock").
    fn name(&self) -> &str;

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_request_defaults() {
        let req: ProviderRequest = serde_json::from_str(
            r#"{"model":"amazon.nova-pro-v1:0","messages":[]}"#,
        )
        .unwrap();
        assert!((req.temperature - 0.2).abs() < f32::EPSILON);
        assert!(req.top_p.is_none());
        assert!(req.guardrail.is_none());
    }

    #[test]
    fn stop_reason_parsing() {
        assert_eq!(StopReason::parse("end_turn"), StopReason::EndTurn);
        assert_eq!(StopReason::parse("guardrail_intervened"), StopReason::GuardrailIntervened);
        assert_eq!(StopReason::parse("tool_use"), StopReason::Other("tool_use".into()));
    }
}
