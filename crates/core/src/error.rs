//! Error types for the FinSight domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external collaborator has its own error enum so callers can branch on
//! "retry", "rephrase", or "show a policy message" instead of a generic failure.

use thiserror::Error;

/// Shown to the end user when the guardrail blocks a request or a response.
pub const POLICY_MESSAGE: &str =
    "I'm sorry, but I can't help with that request. It was blocked by the content policy.";

/// Shown to the end user when the model endpoint cannot produce an answer.
pub const UNAVAILABLE_MESSAGE: &str =
    "I'm temporarily unable to answer. Please try again in a moment.";

/// Shown to the end user when the knowledge base cannot be searched.
pub const RETRIEVAL_UNAVAILABLE_MESSAGE: &str =
    "The knowledge base is currently unavailable. Please try again later.";

/// The top-level error type for all FinSight operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Knowledge base errors ---
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    // --- Model endpoint errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Chat history errors ---
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Caller errors ---
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// The message an end user should see for this failure.
    ///
    /// Raw model text and upstream error bodies never reach the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Provider(e) if e.is_guardrail() => POLICY_MESSAGE,
            Error::Provider(_) => UNAVAILABLE_MESSAGE,
            Error::Retrieval(_) => RETRIEVAL_UNAVAILABLE_MESSAGE,
            Error::InvalidInput(_) => "Please enter a question.",
            Error::History(_) | Error::Tool(_) | Error::Serialization(_) => UNAVAILABLE_MESSAGE,
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Knowledge base unreachable: {0}")]
    Unavailable(String),

    #[error("Knowledge base request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Knowledge base request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Invalid retrieval query: {0}")]
    InvalidQuery(String),

    #[error("Unexpected knowledge base response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Guardrail intervened: {0}")]
    GuardrailIntervened(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Only throttling is worth retrying without changing the request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }

    /// Whether the failure is a content-policy refusal.
    pub fn is_guardrail(&self) -> bool {
        matches!(self, ProviderError::GuardrailIntervened(_))
    }
}

#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt history record: {0}")]
    Serialization(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
