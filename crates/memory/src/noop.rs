//! No-op history store: disables conversation memory entirely.

use async_trait::async_trait;
use finsight_core::error::HistoryError;
use finsight_core::history::HistoryStore;
use finsight_core::message::{SessionId, Turn};

/// A history store that remembers nothing.
pub struct NoopHistory;

#[async_trait]
impl HistoryStore for NoopHistory {
    fn name(&self) -> &str { "none" }

    async fn load(&self, _session: &SessionId) -> Result<Vec<Turn>, HistoryError> {
        Ok(Vec::new())
    }

    async fn append(&self, _session: &SessionId, _turn: Turn) -> Result<(), HistoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn forgets_everything() {
        let store = NoopHistory;
        let session = SessionId::from("conn-1");
        store.append(&session, Turn::human("hi")).await.unwrap();
        assert!(store.load(&session).await.unwrap().is_empty());
    }
}
