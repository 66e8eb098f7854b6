//! Shared test helpers for pattern tests.

use async_trait::async_trait;
use finsight_core::error::{ProviderError, RetrievalError};
use finsight_core::message::Message;
use finsight_core::provider::{Provider, ProviderRequest, ProviderResponse, StopReason, Usage};
use finsight_core::retriever::{RetrievedPassage, Retriever};
use std::sync::Mutex;

/// A provider that answers every call with the same scripted outcome and
/// records each request it receives.
pub struct ScriptedProvider {
    outcome: Result<String, ProviderError>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn answering(text: &str) -> Self {
        Self {
            outcome: Ok(text.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        let text = self.outcome.clone()?;
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model,
            stop_reason: StopReason::EndTurn,
        })
    }
}

/// A retriever that returns fixed passages (or a fixed error).
pub struct ScriptedRetriever {
    outcome: Result<Vec<RetrievedPassage>, RetrievalError>,
    calls: Mutex<Vec<(String, usize)>>,
}

impl ScriptedRetriever {
    pub fn with(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            outcome: Ok(passages),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with(Vec::new())
    }

    pub fn failing(error: RetrievalError) -> Self {
        Self {
            outcome: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(query, top_k)` for each call, in order.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for ScriptedRetriever {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        self.calls.lock().unwrap().push((query.to_string(), top_k));
        self.outcome.clone().map(|mut p| {
            p.truncate(top_k);
            p
        })
    }
}

/// Two semiconductor passages scored 0.91 and 0.77.
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
