//! The assistant context object.
//!
//! Built once per process and shared by reference. It owns the model
//! provider, the knowledge-base retriever, the history store, the tool
//! registry, and the decoding settings used by both entry points.

use std::sync::Arc;
use std::time::Duration;

use finsight_config::{AppConfig, HistoryBackendKind};
use finsight_core::error::{Error, Result};
use finsight_core::history::HistoryStore;
use finsight_core::message::{Message, SessionId};
use finsight_core::provider::{GuardrailConfig, Provider, ProviderRequest};
use finsight_core::retriever::Retriever;
use finsight_core::tool::ToolRegistry;
use finsight_memory::{InMemoryHistory, NoopHistory};
use finsight_providers::{BedrockProvider, RetryingProvider};
use finsight_retrieval::KnowledgeBaseRetriever;
use finsight_tools::MockMarketData;
use tracing::{info, warn};

/// Decoding and retrieval parameters, fixed at construction.
#[derive(Debug, Clone)]
pub struct AssistantSettings {
    pub model_id: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub guardrail: Option<GuardrailConfig>,
    /// Passages fetched for a conversational turn.
    pub chat_top_k: usize,
    /// Passages fetched for a single-shot query.
    pub rag_top_k: usize,
}

impl AssistantSettings {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            temperature: 0.2,
            top_p: 0.99,
            max_tokens: 4096,
            guardrail: None,
            chat_top_k: 5,
            rag_top_k: 5,
        }
    }

    pub fn with_guardrail(mut self, guardrail: GuardrailConfig) -> Self {
        self.guardrail = Some(guardrail);
        self
    }

    fn from_config(config: &AppConfig) -> Self {
        let model = &config.settings.model;
        let retrieval = &config.settings.retrieval;
        Self {
            model_id: config.identifiers.model_id.clone(),
            temperature: model.temperature,
            top_p: model.top_p,
            max_tokens: model.max_tokens,
            guardrail: Some(config.identifiers.guardrail()),
            chat_top_k: retrieval.chat_top_k,
            rag_top_k: retrieval.rag_top_k,
        }
    }
}

/// The investment assistant: retrieval, history, and model in one place.
pub struct InvestmentAssistant {
    pub(crate) provider: Arc<dyn Provider>,
    pub(crate) retriever: Arc<dyn Retriever>,
    pub(crate) history: Arc<dyn HistoryStore>,
    tools: Arc<ToolRegistry>,
    pub(crate) settings: AssistantSettings,
}

impl InvestmentAssistant {
    pub fn new(
        provider: Arc<dyn Provider>,
        retriever: Arc<dyn Retriever>,
        history: Arc<dyn HistoryStore>,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            provider,
            retriever,
            history,
            tools: Arc::new(ToolRegistry::new()),
            settings,
        }
    }

    /// Attach a tool registry for a tool-using agent mode.
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Arc::new(tools);
        self
    }

    /// Build the assistant from startup configuration.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let model = &config.settings.model;
        let api_key = config.settings.api_key.clone();

        let bedrock = BedrockProvider::new(config.runtime_endpoint(), api_key.clone())?;
        let provider: Arc<dyn Provider> = Arc::new(
            RetryingProvider::new(Arc::new(bedrock))
                .with_max_retries(model.max_retries)
                .with_backoff(Duration::from_millis(model.retry_backoff_ms))
                .with_max_backoff(Duration::from_secs(model.max_backoff_secs()))
                .with_timeout(Duration::from_secs(model.timeout_secs)),
        );

        let retriever: Arc<dyn Retriever> = Arc::new(
            KnowledgeBaseRetriever::new(
                config.agent_runtime_endpoint(),
                config.identifiers.knowledge_base_id.clone(),
                api_key,
            )
            .with_timeout(Duration::from_secs(config.settings.retrieval.timeout_secs)),
        );

        let history = open_history(config).await?;

        let tools = finsight_tools::default_registry(
            retriever.clone(),
            Arc::new(MockMarketData::new()),
            config.settings.retrieval.tool_top_k,
        );

        info!(
            model = %config.identifiers.model_id,
            knowledge_base = %config.identifiers.knowledge_base_id,
            history = history.name(),
            tools = tools.len(),
            "Assistant initialized"
        );

        Ok(Self::new(provider, retriever, history, AssistantSettings::from_config(config)).with_tools(tools))
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    /// A single-unit (non-streaming) request carrying the fixed settings.
    pub(crate) fn request(&self, messages: Vec<Message>) -> ProviderRequest {
        ProviderRequest {
            model: self.settings.model_id.clone(),
            messages,
            temperature: self.settings.temperature,
            top_p: Some(self.settings.top_p),
            max_tokens: Some(self.settings.max_tokens),
            guardrail: self.settings.guardrail.clone(),
        }
    }

    /// Conversational reply for display: HTML on success, a fixed
    /// user-facing message on failure.
    pub async fn reply(&self, user_input: &str, session: &SessionId) -> String {
        match self.chat_investment(user_input, session).await {
            Ok(html) => html,
            Err(e) => {
                log_failure(&e, session);
                e.user_message().to_string()
            }
        }
    }
}

fn log_failure(error: &Error, session: &SessionId) {
    match error {
        Error::Provider(e) if e.is_guardrail() => {
            warn!(session = %session, "Request refused by guardrail")
        }
        Error::InvalidInput(_) => {}
        other => warn!(session = %session, error = %other, "Query failed"),
    }
}

async fn open_history(config: &AppConfig) -> Result<Arc<dyn HistoryStore>> {
    Ok(match config.settings.history.backend {
        HistoryBackendKind::Sqlite => Arc::new(
            finsight_memory::SqliteHistory::open(&config.history_path(), &config.identifiers.history_table).await?,
        ),
        HistoryBackendKind::Memory => Arc::new(InMemoryHistory::new()),
        HistoryBackendKind::None => Arc::new(NoopHistory),
    })
}
