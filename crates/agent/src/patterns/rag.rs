//! Single-shot RAG query: `query_knowledge_base_rag`.
//!
//! Stateless with respect to prior turns: no history is read or written.
//! When retrieval finds nothing the model is never called.

use finsight_core::error::{Error, Result};
use finsight_core::message::{Message, SessionId};
use finsight_core::retriever::Citation;
use serde::Serialize;
use tracing::info;

use crate::assistant::InvestmentAssistant;
use crate::format;
use crate::prompt;

/// Answer returned when the knowledge base has no matching passages.
pub const NO_DOCUMENTS_MESSAGE: &str = "No relevant documents found in the knowledge base.";

/// Result of a single-shot query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagResult {
    /// The answer rendered as HTML (or the fixed no-documents message).
    pub answer: String,
    /// One citation per retrieved passage, in retrieval order.
    pub citations: Vec<Citation>,
    pub retrieved_count: usize,
}

impl RagResult {
    fn no_documents() -> Self {
        Self {
            answer: NO_DOCUMENTS_MESSAGE.to_string(),
            citations: Vec::new(),
            retrieved_count: 0,
        }
    }
}

impl InvestmentAssistant {
    /// Answer one question from the knowledge base, with citations.
    pub async fn query_knowledge_base_rag(&self, query: &str, session: &SessionId) -> Result<RagResult> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".into()));
        }

        info!(session = %session, "RAG query");
        let passages = self.retriever.retrieve(query, self.settings.rag_top_k).await?;
        info!(session = %session, retrieved = passages.len(), "Retrieved documents from knowledge base");

        if passages.is_empty() {
            info!(session = %session, "No documents retrieved, skipping model call");
            return Ok(RagResult::no_documents());
        }

        let instruction = prompt::single_shot(query, &passages);
        let response = self.provider.complete(self.request(vec![Message::user(instruction)])).await?;
        info!(session = %session, "RAG response generated");

        Ok(RagResult {
            answer: format::to_html(&response.message.content),
            citations: passages.iter().map(|p| p.citation()).collect(),
            retrieved_count: passages.len(),
        })
    }
}
