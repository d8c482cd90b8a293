//! Session registry.
//!
//! The only state shared across sessions. The map is guarded by a
//! reader/writer lock; each session sits behind its own mutex so that calls
//! for one session are serialized while different sessions proceed in
//! parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::Session;

/// Shared, individually locked session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Identity-keyed store of live sessions.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a new idle session. Returns a snapshot of it.
    pub async fn create(
        &self,
        candidate_name: impl Into<String>,
        target_role: impl Into<String>,
        company_context: Option<String>,
        personality_id: impl Into<String>,
    ) -> Session {
        let session = Session::new(candidate_name, target_role, company_context, personality_id);
        let snapshot = session.clone();

        self.sessions
            .write()
            .await
            .insert(session.id, Arc::new(Mutex::new(session)));

        tracing::info!(
            session_id = %snapshot.id,
            personality_id = %snapshot.personality_id,
            "Session created"
        );
        snapshot
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Phase, DEFAULT_PERSONALITY_ID};

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.len().await, 0);

        let session = registry
            .create("Ada", "Engineer", Some("Compilers".to_string()), DEFAULT_PERSONALITY_ID)
            .await;
        assert_eq!(session.phase(), Phase::Idle);

        let handle = registry.get(session.id).await.unwrap();
        let stored = handle.lock().await;
        assert_eq!(stored.candidate_name, "Ada");
        assert_eq!(stored.company_context.as_deref(), Some("Compilers"));
        assert!(registry.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_handles_share_state() {
        let registry = SessionRegistry::new();
        let session = registry.create("Ada", "Engineer", None, DEFAULT_PERSONALITY_ID).await;

        {
            let handle = registry.get(session.id).await.unwrap();
            handle.lock().await.transition_to(Phase::Greeting).unwrap();
        }

        let handle = registry.get(session.id).await.unwrap();
        assert_eq!(handle.lock().await.phase(), Phase::Greeting);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_and_get() {
        let registry = SessionRegistry::new();

        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    let session = registry
                        .create(format!("Candidate {}", i), "Engineer", None, DEFAULT_PERSONALITY_ID)
                        .await;
                    let handle = registry.get(session.id).await.unwrap();
                    let found = handle.lock().await.id;
                    assert_eq!(found, session.id);
                    session.id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }

        assert_eq!(registry.len().await, 64);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 64);
    }
}
