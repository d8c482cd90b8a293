//! SQLite-backed history store.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use super::models::ExchangeRow;
use super::{candidate_key, HistoryError, HistoryRecord, HistoryStore};
use crate::domain::Session;

/// History store for exchanges, persisted with SQLx.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init_schema(&self) -> Result<(), HistoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS exchanges (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                candidate_key TEXT NOT NULL,
                candidate_name TEXT NOT NULL,
                target_role TEXT NOT NULL,
                candidate_message TEXT NOT NULL,
                interviewer_response TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_exchanges_candidate_key ON exchanges(candidate_key);
            CREATE INDEX IF NOT EXISTS idx_exchanges_session_id ON exchanges(session_id);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn record(
        &self,
        session: &Session,
        candidate_message: &str,
        interviewer_response: &str,
    ) -> Result<(), HistoryError> {
        let record = HistoryRecord::new(session, candidate_message, interviewer_response);

        sqlx::query(
            r#"
            INSERT INTO exchanges (session_id, candidate_key, candidate_name, target_role,
                                   candidate_message, interviewer_response, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.session_id.to_string())
        .bind(candidate_key(&record.candidate_name))
        .bind(&record.candidate_name)
        .bind(&record.target_role)
        .bind(&record.candidate_message)
        .bind(&record.interviewer_response)
        .bind(record.recorded_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::debug!(session_id = %session.id, "Stored exchange");
        Ok(())
    }

    async fn candidate_history(
        &self,
        candidate_name: &str,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, HistoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<ExchangeRow> = sqlx::query_as(
            r#"
            SELECT session_id, candidate_name, target_role, candidate_message,
                   interviewer_response, recorded_at
            FROM exchanges
            WHERE candidate_key = ?
            ORDER BY seq DESC
            LIMIT ?
            "#,
        )
        .bind(candidate_key(candidate_name))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        // Newest first from the query; callers get oldest first.
        rows.into_iter().rev().map(HistoryRecord::try_from).collect()
    }

    async fn clear_session(&self, session_id: Uuid) -> Result<usize, HistoryError> {
        let result = sqlx::query("DELETE FROM exchanges WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() as usize;
        tracing::info!(session_id = %session_id, removed, "Cleared session history");
        Ok(removed)
    }
}
