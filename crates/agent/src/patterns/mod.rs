//! The two query entry points.
//!
//! 1. **Conversational**: retrieved context in the system instruction,
//!    stored history, exchange appended after a successful answer
//! 2. **Single-shot RAG**: numbered passages and the question in one
//!    instruction, citations returned alongside the answer

pub mod chat;
pub mod rag;

pub use rag::{NO_DOCUMENTS_MESSAGE, RagResult};

#[cfg(test)]
pub(crate) mod test_helpers;
