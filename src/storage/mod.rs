//! Storage layer for Interview Core.
//!
//! Records candidate/interviewer exchanges for cross-session history.
//! Two backends are provided: an in-memory store and a SQLite store via SQLx.

mod memory;
mod models;
mod repository;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Session;
use crate::error::InterviewError;

pub use memory::InMemoryHistoryStore;
pub use models::HistoryRecord;
pub use repository::SqliteHistoryStore;

/// Failure inside a history backend.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt history record: {0}")]
    Corrupt(String),
}

impl From<HistoryError> for InterviewError {
    fn from(e: HistoryError) -> Self {
        match e {
            HistoryError::Database(e) => InterviewError::Database(e),
            HistoryError::Corrupt(msg) => InterviewError::Internal(msg),
        }
    }
}

/// Persistence of interview exchanges.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Store one candidate message and the interviewer's reply.
    async fn record(
        &self,
        session: &Session,
        candidate_message: &str,
        interviewer_response: &str,
    ) -> Result<(), HistoryError>;

    /// The last `limit` exchanges for a candidate, oldest first.
    async fn candidate_history(
        &self,
        candidate_name: &str,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, HistoryError>;

    /// Forget every exchange from one session. Returns the number removed.
    async fn clear_session(&self, session_id: Uuid) -> Result<usize, HistoryError>;
}

/// History is grouped by candidate name, case-insensitively, with spaces
/// normalised to underscores.
pub fn candidate_key(candidate_name: &str) -> String {
    candidate_name.to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_key() {
        assert_eq!(candidate_key("Ada Lovelace"), "ada_lovelace");
        assert_eq!(candidate_key("ada lovelace"), candidate_key("ADA LOVELACE"));
    }
}
