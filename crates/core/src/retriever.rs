//! Retriever trait: semantic search over the knowledge corpus.
//!
//! Passages are ephemeral: they live for one request and are never persisted.
//! An `Ok(vec![])` means the corpus had nothing relevant; an `Err` means the
//! corpus could not be searched. Callers branch on the two.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::RetrievalError;

/// Source locator used when the corpus does not report one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// One ranked passage returned by the knowledge corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Passage text
    pub text: String,

    /// Relevance score (higher is more relevant)
    pub score: f64,

    /// Where the passage came from (e.g. an `s3://` URI)
    pub source: String,
}

impl RetrievedPassage {
    pub fn new(text: impl Into<String>, score: f64, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            score,
            source: source.into(),
        }
    }

    pub fn citation(&self) -> Citation {
        Citation {
            source: self.source.clone(),
            score: self.score,
        }
    }
}

/// A record linking an answer to a passage's origin and relevance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source: String,
    pub score: f64,
}

/// The core Retriever trait.
///
/// Implementations: hosted knowledge base over HTTP, static in-process corpus.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The retriever name (e.g., "bedrock_kb", "static").
    fn name(&self) -> &str;

    /// Return up to `top_k` passages ordered by descending score.
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> std::result::Result<Vec<RetrievedPassage>, RetrievalError>;
}

/// Reject queries the corpus cannot answer before making a network call.
pub fn validate_query(query: &str, top_k: usize) -> std::result::Result<(), RetrievalError> {
    if query.trim().is_empty() {
        return Err(RetrievalError::InvalidQuery("query must not be empty".into()));
    }
    if top_k == 0 {
        return Err(RetrievalError::InvalidQuery("top_k must be positive".into()));
    }
    Ok(())
}

/// Stable sort by descending score; ties keep the corpus order.
pub fn rank(passages: &mut [RetrievedPassage]) {
    passages.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}
