//! Scripted collaborators for entry-point tests.

#![allow(dead_code)]

use async_trait::async_trait;
use finsight_agent::{AssistantSettings, InvestmentAssistant};
use finsight_core::error::{ProviderError, RetrievalError};
use finsight_core::history::HistoryStore;
use finsight_core::message::Message;
use finsight_core::provider::{Provider, ProviderRequest, ProviderResponse, StopReason};
use finsight_core::retriever::{RetrievedPassage, Retriever};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Echoes a numbered answer and records every prompt.
pub struct CountingProvider {
    calls: AtomicUsize,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl CountingProvider {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(request.messages);
        Ok(ProviderResponse {
            message: Message::assistant(format!("Answer {n}")),
            usage: None,
            model: request.model,
            stop_reason: StopReason::EndTurn,
        })
    }
}

/// Returns the same passages for every query.
pub struct FixedRetriever(pub Result<Vec<RetrievedPassage>, RetrievalError>);

#[async_trait]
impl Retriever for FixedRetriever {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn retrieve(&self, _query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        self.0.clone().map(|mut p| {
            p.truncate(top_k);
            p
        })
    }
}

pub fn semiconductor_passages() -> Vec<RetrievedPassage> {
    vec![
        RetrievedPassage::new(
            "Foundry utilization reached 92% as AI accelerator demand grew.",
            0.91,
            "s3://finsight-kb/semis-q3.pdf",
        ),
        RetrievedPassage::new(
            "Memory chip prices rose 15% quarter over quarter.",
            0.77,
            "s3://finsight-kb/memory-outlook.pdf",
        ),
    ]
}

pub fn build(
    provider: Arc<CountingProvider>,
    passages: Vec<RetrievedPassage>,
    history: Arc<dyn HistoryStore>,
) -> InvestmentAssistant {
    InvestmentAssistant::new(
        provider,
        Arc::new(FixedRetriever(Ok(passages))),
        history,
        AssistantSettings::new("amazon.nova-pro-v1:0"),
    )
}
