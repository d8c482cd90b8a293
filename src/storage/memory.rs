//! In-memory history store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{candidate_key, HistoryError, HistoryRecord, HistoryStore};
use crate::domain::Session;

/// Process-local history, lost on restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<RwLock<HashMap<String, Vec<HistoryRecord>>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn record(
        &self,
        session: &Session,
        candidate_message: &str,
        interviewer_response: &str,
    ) -> Result<(), HistoryError> {
        let record = HistoryRecord::new(session, candidate_message, interviewer_response);
        let mut records = self.records.write().await;
        records
            .entry(candidate_key(&session.candidate_name))
            .or_default()
            .push(record);

        tracing::debug!(session_id = %session.id, "Stored exchange");
        Ok(())
    }

    async fn candidate_history(
        &self,
        candidate_name: &str,
        limit: usize,
    ) -> Result<Vec<HistoryRecord>, HistoryError> {
        let records = self.records.read().await;
        let history = records
            .get(&candidate_key(candidate_name))
            .map(|entries| {
                let start = entries.len().saturating_sub(limit);
                entries[start..].to_vec()
            })
            .unwrap_or_default();
        Ok(history)
    }

    async fn clear_session(&self, session_id: Uuid) -> Result<usize, HistoryError> {
        let mut records = self.records.write().await;
        let mut removed = 0;
        for entries in records.values_mut() {
            let before = entries.len();
            entries.retain(|r| r.session_id != session_id);
            removed += before - entries.len();
        }
        records.retain(|_, entries| !entries.is_empty());

        tracing::info!(session_id = %session_id, removed, "Cleared session history");
        Ok(removed)
    }
}
