//! LLM provider implementations for FinSight.
//!
//! All providers implement the `finsight_core::Provider` trait.

pub mod bedrock;
pub mod retry;

pub use bedrock::BedrockProvider;
pub use retry::RetryingProvider;
