//! SQLite history store.
//!
//! One table (named by configuration) holds every turn:
//! `(session_id, seq, speaker, text, created_at)` with `(session_id, seq)` as
//! the primary key. `seq` is assigned inside the insert from the current
//! maximum for the session, so order never depends on wall-clock time.

use async_trait::async_trait;
use chrono::Utc;
use finsight_core::error::HistoryError;
use finsight_core::history::HistoryStore;
use finsight_core::message::{SessionId, Speaker, Turn};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// A durable history store backed by a SQLite file.
pub struct SqliteHistory {
    pool: SqlitePool,
    table: String,
    write_lock: Mutex<()>,
}

/// Quote a table name as an SQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SqliteHistory {
    /// Open (or create) the database at `path` and ensure the table exists.
    pub async fn open(path: &Path, table: &str) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| HistoryError::Storage(format!("Cannot create {}: {e}", parent.display())))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| HistoryError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self::from_pool(pool, table).await?;
        info!(path = %path.display(), table, "SQLite history store initialized");
        Ok(store)
    }

    /// Create from an existing pool.
    pub async fn from_pool(pool: SqlitePool, table: &str) -> Result<Self, HistoryError> {
        let store = Self {
            pool,
            table: quote_ident(table),
            write_lock: Mutex::new(()),
        };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), HistoryError> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {t} (
                session_id  TEXT NOT NULL,
                seq         INTEGER NOT NULL,
                speaker     TEXT NOT NULL,
                text        TEXT NOT NULL,
                created_at  TEXT NOT NULL,
                PRIMARY KEY (session_id, seq)
            )
            "#,
            t = self.table
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| HistoryError::Storage(format!("history table: {e}")))?;

        debug!(table = %self.table, "SQLite migrations complete");
        Ok(())
    }

    async fn insert(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        session: &SessionId,
        turn: &Turn,
    ) -> Result<(), HistoryError> {
        let sql = format!(
            r#"
            INSERT INTO {t} (session_id, seq, speaker, text, created_at)
            SELECT ?1, COALESCE(MAX(seq), 0) + 1, ?2, ?3, ?4
            FROM {t} WHERE session_id = ?1
            "#,
            t = self.table
        );
        sqlx::query(&sql)
            .bind(session.as_str())
            .bind(turn.speaker.as_str())
            .bind(&turn.text)
            .bind(turn.created_at.to_rfc3339())
            .execute(&mut **tx)
            .await
            .map_err(|e| HistoryError::Storage(format!("INSERT failed: {e}")))?;
        Ok(())
    }

    async fn append_all(&self, session: &SessionId, turns: &[Turn]) -> Result<(), HistoryError> {
        let _guard = self.write_lock.lock().await;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| HistoryError::Storage(format!("BEGIN failed: {e}")))?;
        for turn in turns {
            self.insert(&mut tx, session, turn).await?;
        }
        tx.commit()
            .await
            .map_err(|e| HistoryError::Storage(format!("COMMIT failed: {e}")))?;

        debug!(session = %session, turns = turns.len(), "Appended history");
        Ok(())
    }

    fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<Turn, HistoryError> {
        let speaker: String = row
            .try_get("speaker")
            .map_err(|e| HistoryError::Serialization(format!("speaker column: {e}")))?;
        let text: String = row
            .try_get("text")
            .map_err(|e| HistoryError::Serialization(format!("text column: {e}")))?;
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| HistoryError::Serialization(format!("created_at column: {e}")))?;

        let speaker = Speaker::parse(&speaker)
            .ok_or_else(|| HistoryError::Serialization(format!("unknown speaker '{speaker}'")))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| HistoryError::Serialization(format!("created_at '{created_at}': {e}")))?;

        Ok(Turn {
            speaker,
            text,
            created_at,
        })
    }
}

#[async_trait]
impl HistoryStore for SqliteHistory {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self, session: &SessionId) -> Result<Vec<Turn>, HistoryError> {
        let sql = format!(
            "SELECT speaker, text, created_at FROM {t} WHERE session_id = ?1 ORDER BY seq",
            t = self.table
        );
        let rows = sqlx::query(&sql)
            .bind(session.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| HistoryError::Storage(format!("SELECT failed: {e}")))?;

        rows.iter().map(Self::row_to_turn).collect()
    }

    async fn append(&self, session: &SessionId, turn: Turn) -> Result<(), HistoryError> {
        self.append_all(session, std::slice::from_ref(&turn)).await
    }

    async fn append_exchange(
        &self,
        session: &SessionId,
        human: Turn,
        assistant: Turn,
    ) -> Result<(), HistoryError> {
        self.append_all(session, &[human, assistant]).await
    }
}
