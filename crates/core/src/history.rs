//! HistoryStore trait: ordered, append-only conversation turns per session.
//!
//! Reading and appending are two explicit steps: the orchestration layer loads
//! turns before prompting and appends the exchange only after the model has
//! answered successfully.

use async_trait::async_trait;
use crate::error::HistoryError;
use crate::message::{SessionId, Turn};

/// The core HistoryStore trait.
///
/// Implementations: SQLite, in-memory, none (no-op).
///
/// Appends to one session must be serialized by the implementation; two
/// concurrent appends must never lose or interleave turns.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory", "none").
    fn name(&self) -> &str;

    /// Load every turn of a session in chronological order.
    async fn load(&self, session: &SessionId) -> std::result::Result<Vec<Turn>, HistoryError>;

    /// Append one turn to the end of a session.
    async fn append(&self, session: &SessionId, turn: Turn) -> std::result::Result<(), HistoryError>;

    /// Append a human turn and its answer as one unit.
    ///
    /// The default calls [`append`](Self::append) twice; backends that can
    /// write both turns atomically override it.
    async fn append_exchange(
        &self,
        session: &SessionId,
        human: Turn,
        assistant: Turn,
    ) -> std::result::Result<(), HistoryError> {
        self.append(session, human).await?;
        self.append(session, assistant).await
    }
}
