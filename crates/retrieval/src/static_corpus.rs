//! In-process retriever over a fixed set of documents.
//!
//! Scores each document by the share of query terms it contains. Useful for
//! offline runs and for exercising the orchestration layer without a
//! hosted knowledge base.

use async_trait::async_trait;
use finsight_core::error::RetrievalError;
use finsight_core::retriever::{self, RetrievedPassage, Retriever};
use std::collections::HashSet;

/// A retriever that searches documents held in memory.
pub struct StaticRetriever {
    documents: Vec<(String, String)>,
}

impl StaticRetriever {
    pub fn new() -> Self {
        Self { documents: Vec::new() }
    }

    /// Add a document with its source locator.
    pub fn with_document(mut self, source: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.push((source.into(), text.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl Default for StaticRetriever {
    fn default() -> Self {
        Self::new()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

#[async_trait]
impl Retriever for StaticRetriever {
    fn name(&self) -> &str {
        "static"
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        retriever::validate_query(query, top_k)?;

        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut results: Vec<RetrievedPassage> = self
            .documents
            .iter()
            .filter_map(|(source, text)| {
                let doc_terms = terms(text);
                let hits = query_terms.iter().filter(|t| doc_terms.contains(*t)).count();
                (hits > 0).then(|| {
                    RetrievedPassage::new(text.clone(), hits as f64 / query_terms.len() as f64, source.clone())
                })
            })
            .collect();

        retriever::rank(&mut results);
        results.truncate(top_k);
        Ok(results)
    }
}
