//! Bedrock knowledge-base retriever over the agent-runtime Retrieve API.
//!
//! Sends `POST {endpoint}/knowledgebases/{kbId}/retrieve` and turns each
//! `retrievalResults` entry into a [`RetrievedPassage`]. An unreachable or
//! failing service is always an `Err`; only a successful reply with no
//! results is an empty `Ok`.

use async_trait::async_trait;
use finsight_core::error::RetrievalError;
use finsight_core::retriever::{self, RetrievedPassage, Retriever, UNKNOWN_SOURCE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Retriever backed by a hosted Bedrock knowledge base.
pub struct KnowledgeBaseRetriever {
    base_url: String,
    knowledge_base_id: String,
    api_key: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl KnowledgeBaseRetriever {
    pub fn new(
        base_url: impl Into<String>,
        knowledge_base_id: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            knowledge_base_id: knowledge_base_id.into(),
            api_key,
            timeout: Duration::from_secs(15),
            client: reqwest::Client::new(),
        }
    }

    /// Create a retriever for the regional agent-runtime endpoint.
    pub fn for_region(region: &str, knowledge_base_id: impl Into<String>, api_key: Option<String>) -> Self {
        Self::new(
            format!("https://bedrock-agent-runtime.{region}.amazonaws.com"),
            knowledge_base_id,
            api_key,
        )
    }

    /// Deadline for one retrieve call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn knowledge_base_id(&self) -> &str {
        &self.knowledge_base_id
    }

    fn retrieve_url(&self) -> Result<reqwest::Url, RetrievalError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| RetrievalError::Unavailable(format!("Invalid endpoint {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| RetrievalError::Unavailable(format!("Endpoint cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["knowledgebases", self.knowledge_base_id.as_str(), "retrieve"]);
        Ok(url)
    }

    async fn send(&self, query: &str, top_k: usize) -> Result<RetrieveResponse, RetrievalError> {
        let body = RetrieveRequest {
            retrieval_query: RetrievalQuery { text: query.to_string() },
            retrieval_configuration: RetrievalConfiguration {
                vector_search_configuration: VectorSearchConfiguration {
                    number_of_results: top_k,
                },
            },
        };

        let mut http = self.client.post(self.retrieve_url()?).json(&body);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http
            .send()
            .await
            .map_err(|e| RetrievalError::Unavailable(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let message = response.text().await.unwrap_or_default();
            warn!(status, body = %message, "Retrieve returned error");
            return Err(RetrievalError::ApiError {
                status_code: status,
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| RetrievalError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Retriever for KnowledgeBaseRetriever {
    fn name(&self) -> &str {
        "bedrock_kb"
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>, RetrievalError> {
        retriever::validate_query(query, top_k)?;

        let response = tokio::time::timeout(self.timeout, self.send(query, top_k))
            .await
            .map_err(|_| RetrievalError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            })??;

        let mut passages: Vec<RetrievedPassage> = response
            .retrieval_results
            .into_iter()
            .map(ApiResult::into_passage)
            .collect();
        retriever::rank(&mut passages);
        passages.truncate(top_k);

        for p in &passages {
            debug!(
                score = p.score,
                source = %p.source,
                preview = %p.text.chars().take(200).collect::<String>(),
                "KB passage"
            );
        }

        Ok(passages)
    }
}

// --- Retrieve wire types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest {
    retrieval_query: RetrievalQuery,
    retrieval_configuration: RetrievalConfiguration,
}

#[derive(Debug, Serialize)]
struct RetrievalQuery {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfiguration {
    vector_search_configuration: VectorSearchConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorSearchConfiguration {
    number_of_results: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveResponse {
    #[serde(default)]
    retrieval_results: Vec<ApiResult>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiResult {
    #[serde(default)]
    content: Option<ApiContent>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    location: Option<ApiLocation>,
}

#[derive(Debug, Deserialize)]
struct ApiContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLocation {
    #[serde(default)]
    s3_location: Option<UriLocation>,
    #[serde(default)]
    web_location: Option<UrlLocation>,
}

#[derive(Debug, Deserialize)]
struct UriLocation {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UrlLocation {
    url: Option<String>,
}

impl ApiResult {
    fn into_passage(self) -> RetrievedPassage {
        let text = self.content.and_then(|c| c.text).unwrap_or_default();
        let source = self
            .location
            .and_then(|l| {
                l.s3_location
                    .and_then(|s| s.uri)
                    .or_else(|| l.web_location.and_then(|w| w.url))
            })
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
        RetrievedPassage::new(text, self.score.unwrap_or(0.0), source)
    }
}
