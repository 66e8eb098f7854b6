//! The investment assistant: retrieval-augmented answers over a knowledge base.
//!
//! Two entry points share one [`InvestmentAssistant`] context object:
//!
//! 1. [`InvestmentAssistant::chat_investment`] answers within a session,
//!    grounding on retrieved passages and prior turns
//! 2. [`InvestmentAssistant::query_knowledge_base_rag`] answers a one-off
//!    question and reports which passages it was grounded on
//!
//! Both follow the same order: retrieval, then prompt assembly, then one
//! model call, then HTML rendering.

pub mod assistant;
pub mod format;
pub mod patterns;
pub mod prompt;

pub use assistant::{AssistantSettings, InvestmentAssistant};
pub use patterns::{NO_DOCUMENTS_MESSAGE, RagResult};
pub use prompt::{ContextState, INVESTMENT_ANALYST_INSTRUCTION};
