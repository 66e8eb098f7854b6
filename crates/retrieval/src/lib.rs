//! Retrieval clients for FinSight.
//!
//! All retrievers implement the `finsight_core::Retriever` trait.

pub mod knowledge_base;
pub mod static_corpus;

pub use knowledge_base::KnowledgeBaseRetriever;
pub use static_corpus::StaticRetriever;
