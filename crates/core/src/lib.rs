//! # FinSight Core
//!
//! Domain types, traits, and error definitions for the FinSight investment
//! assistant. This crate has **no service dependencies**: it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here:
//! - [`Provider`] for the hosted LLM endpoint
//! - [`Retriever`] for the hosted knowledge base
//! - [`HistoryStore`] for the chat-history table
//! - [`Tool`] for callable domain functions
//!
//! Implementations live in their own crates, so the orchestration layer can be
//! exercised against scripted stand-ins in tests.

pub mod error;
pub mod history;
pub mod message;
pub mod provider;
pub mod retriever;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use history::HistoryStore;
pub use message::{Message, Role, SessionId, Speaker, Turn};
pub use provider::{GuardrailConfig, Provider, ProviderRequest, ProviderResponse, StopReason};
pub use retriever::{Citation, RetrievedPassage, Retriever};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
