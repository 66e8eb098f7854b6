//! Prompt assembly for the two query modes.
//!
//! Conversational mode folds retrieved context into the system instruction
//! and places stored history before the current question. Single-shot mode
//! composes numbered, score-annotated passages and the question into one
//! user message with no history.

use finsight_core::message::{Message, Turn};
use finsight_core::retriever::RetrievedPassage;

/// Base system instruction for conversational mode.
pub const INVESTMENT_ANALYST_INSTRUCTION: &str = "You are a helpful investment analyst assistant.
Answer questions based on the provided context from financial documents.
If the context contains relevant information, use it to provide accurate answers with specific data.
If the context doesn't contain relevant information, say so and provide general knowledge.";

/// Knowledge-base context available to a conversational turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextState {
    /// Passage texts joined with blank lines.
    Grounded(String),
    /// The search succeeded but found nothing usable.
    Empty,
    /// The search failed.
    Unavailable,
}

impl ContextState {
    /// Build the state from a successful retrieval.
    pub fn from_passages(passages: &[RetrievedPassage]) -> Self {
        let joined = join_context(passages);
        if joined.is_empty() {
            ContextState::Empty
        } else {
            ContextState::Grounded(joined)
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, ContextState::Grounded(_))
    }
}

/// Join non-empty passage texts with blank-line separators.
pub fn join_context(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The system instruction, extended with context or a disclaimer.
pub fn system_instruction(base: &str, context: &ContextState) -> String {
    match context {
        ContextState::Grounded(kb_context) => format!(
            "{base}\n\nHere is relevant context from the knowledge base documents:\n{kb_context}\n\n\
             Use this context to answer the user's question accurately."
        ),
        ContextState::Empty => base.to_string(),
        ContextState::Unavailable => format!(
            "{base}\n\nThe knowledge base could not be searched for this question. \
             Answer from general knowledge and tell the user that no supporting documents were available."
        ),
    }
}

/// System instruction, then history in order, then the current question.
pub fn conversational(system: String, history: &[Turn], user_text: &str) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(system));
    messages.extend(history.iter().map(Turn::to_message));
    messages.push(Message::user(user_text));
    messages
}

/// One composed instruction for single-shot mode.
pub fn single_shot(query: &str, passages: &[RetrievedPassage]) -> String {
    let context = passages
        .iter()
        .enumerate()
        .map(|(i, p)| format!("[Document {}] (Score: {:.2})\n{}", i + 1, p.score, p.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Based on the following context from financial documents, please answer the user's question.
If the answer cannot be found in the context, say so clearly.

Context:
{context}

User Question: {query}

Please provide a comprehensive answer based on the context above. \
Include specific numbers and data from the documents when available."
    )
}
