//! In-memory history store: useful for testing and ephemeral sessions.
//!
//! Each session owns its own `Mutex`, so appends to one session are
//! serialized while different sessions proceed independently.

use async_trait::async_trait;
use finsight_core::error::HistoryError;
use finsight_core::history::HistoryStore;
use finsight_core::message::{SessionId, Turn};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

type SessionLog = Arc<Mutex<Vec<Turn>>>;

/// A history store that keeps turns in process memory.
pub struct InMemoryHistory {
    sessions: RwLock<HashMap<SessionId, SessionLog>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of sessions that have at least one turn.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn log_for(&self, session: &SessionId) -> SessionLog {
        if let Some(log) = self.sessions.read().await.get(session) {
            return log.clone();
        }
        self.sessions
            .write()
            .await
            .entry(session.clone())
            .or_default()
            .clone()
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    fn name(&self) -> &str { "in_memory" }

    async fn load(&self, session: &SessionId) -> Result<Vec<Turn>, HistoryError> {
        let log = self.sessions.read().await.get(session).cloned();
        match log {
            Some(log) => Ok(log.lock().await.clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn append(&self, session: &SessionId, turn: Turn) -> Result<(), HistoryError> {
        self.log_for(session).await.lock().await.push(turn);
        Ok(())
    }

    async fn append_exchange(
        &self,
        session: &SessionId,
        human: Turn,
        assistant: Turn,
    ) -> Result<(), HistoryError> {
        let log = self.log_for(session).await;
        let mut turns = log.lock().await;
        turns.push(human);
        turns.push(assistant);
        Ok(())
    }
}
