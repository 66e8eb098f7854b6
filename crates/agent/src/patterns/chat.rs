//! Conversational query: `chat_investment`.
//!
//! # Flow
//!
//! 1. Retrieve passages for the question
//! 2. Fold their joined text into the system instruction
//! 3. Load the session's history
//! 4. Invoke the model with system + history + question
//! 5. Append the human/assistant exchange, only after success
//! 6. Render the answer as HTML
//!
//! A failed retrieval or history load degrades the answer instead of
//! failing it. A failed append is logged and the answer is still returned.

use finsight_core::error::{Error, Result};
use finsight_core::message::{SessionId, Turn};
use tracing::{debug, info, warn};

use crate::assistant::InvestmentAssistant;
use crate::format;
use crate::prompt::{self, ContextState, INVESTMENT_ANALYST_INSTRUCTION};

impl InvestmentAssistant {
    /// Answer a message within a session, returning HTML.
    pub async fn chat_investment(&self, user_input: &str, session: &SessionId) -> Result<String> {
        if user_input.trim().is_empty() {
            return Err(Error::InvalidInput("message must not be empty".into()));
        }

        info!(session = %session, "Retrieving context from knowledge base");
        let context = match self.retriever.retrieve(user_input, self.settings.chat_top_k).await {
            Ok(passages) => {
                let context = ContextState::from_passages(&passages);
                let context_len = match &context {
                    ContextState::Grounded(text) => text.len(),
                    _ => 0,
                };
                info!(session = %session, retrieved = passages.len(), context_len, "Retrieved knowledge base documents");
                if !context.is_grounded() {
                    info!(session = %session, "No knowledge base context, answering from general knowledge");
                }
                context
            }
            Err(e) => {
                warn!(session = %session, error = %e, "Knowledge base unavailable, answering with disclaimer");
                ContextState::Unavailable
            }
        };

        let history = match self.history.load(session).await {
            Ok(turns) => turns,
            Err(e) => {
                warn!(session = %session, error = %e, "History load failed, continuing without history");
                Vec::new()
            }
        };
        debug!(session = %session, turns = history.len(), "Loaded history");

        let system = prompt::system_instruction(INVESTMENT_ANALYST_INSTRUCTION, &context);
        let messages = prompt::conversational(system, &history, user_input);

        let response = self.provider.complete(self.request(messages)).await?;
        let answer = response.message.content;
        debug!(session = %session, answer_len = answer.len(), stop_reason = ?response.stop_reason, "Chat response");

        if let Err(e) = self
            .history
            .append_exchange(session, Turn::human(user_input), Turn::assistant(&answer))
            .await
        {
            warn!(session = %session, error = %e, "History append failed, answer still returned");
        }

        Ok(format::to_html(&answer))
    }
}
