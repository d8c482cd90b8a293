//! Interview Coordinator - the caller-facing surface of the engine.
//!
//! Validates requests at the boundary, resolves session ids through the
//! registry and runs the state machine under the session's lock. Every
//! session-scoped call fails with `NotFound` for an unknown id.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::guard::ContentGuard;
use super::machine::{ProcessOutcome, SessionStateMachine};
use super::personality::PersonalityCatalog;
use super::registry::{SessionHandle, SessionRegistry};
use super::responder::Responder;
use super::scorer::Scorer;
use crate::config::GuardConfig;
use crate::domain::{Evaluation, Personality, Phase, Session, TranscriptEntry, DEFAULT_PERSONALITY_ID};
use crate::error::{InterviewError, InterviewResult};
use crate::storage::{HistoryRecord, HistoryStore};

const MAX_CANDIDATE_NAME_CHARS: usize = 100;
const MAX_TARGET_ROLE_CHARS: usize = 200;
const MAX_COMPANY_CONTEXT_CHARS: usize = 2000;

/// Parameters for a new session.
#[derive(Debug, Clone, Default)]
pub struct NewSession {
    pub candidate_name: String,
    pub target_role: String,
    pub company_context: Option<String>,
    /// Defaults to the default persona.
    pub personality_id: Option<String>,
}

/// Read-only projection of a session.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub phase: Phase,
    pub candidate_name: String,
    pub target_role: String,
    pub personality_id: String,
    pub transcript_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Session> for SessionStatus {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id,
            phase: session.phase(),
            candidate_name: session.candidate_name.clone(),
            target_role: session.target_role.clone(),
            personality_id: session.personality_id.clone(),
            transcript_count: session.transcript().len(),
            evaluation: session.evaluation().cloned(),
            created_at: session.created_at(),
            updated_at: session.updated_at(),
        }
    }
}

/// What the guard makes of a piece of text, without side effects.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InspectReport {
    pub filtered: String,
    pub was_modified: bool,
    pub warnings: Vec<String>,
    pub length_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_message: Option<String>,
}

/// Word-count policy applied to candidate messages.
#[derive(Debug, Clone, Copy)]
struct LengthPolicy {
    min_words: usize,
    max_words: usize,
    enforce: bool,
}

/// Entry point for every interview operation.
pub struct InterviewCoordinator {
    registry: SessionRegistry,
    machine: SessionStateMachine,
    guard: Arc<ContentGuard>,
    history: Arc<dyn HistoryStore>,
    personalities: Arc<PersonalityCatalog>,
    length: LengthPolicy,
}

impl InterviewCoordinator {
    pub fn new(
        guard: Arc<ContentGuard>,
        guard_config: &GuardConfig,
        scorer: Arc<Scorer>,
        responder: Arc<dyn Responder>,
        history: Arc<dyn HistoryStore>,
        personalities: Arc<PersonalityCatalog>,
    ) -> Self {
        let machine = SessionStateMachine::new(
            guard.clone(),
            scorer,
            responder,
            history.clone(),
            personalities.clone(),
        );

        Self {
            registry: SessionRegistry::new(),
            machine,
            guard,
            history,
            personalities,
            length: LengthPolicy {
                min_words: guard_config.min_words,
                max_words: guard_config.max_words,
                enforce: guard_config.enforce_length,
            },
        }
    }

    pub fn personalities(&self) -> &PersonalityCatalog {
        &self.personalities
    }

    pub async fn session_count(&self) -> usize {
        self.registry.len().await
    }

    /// Validate and register a new idle session.
    pub async fn create_session(&self, request: NewSession) -> InterviewResult<Session> {
        check_chars("candidate_name", &request.candidate_name, 1, MAX_CANDIDATE_NAME_CHARS)?;
        check_chars("target_role", &request.target_role, 1, MAX_TARGET_ROLE_CHARS)?;
        if let Some(context) = &request.company_context {
            check_chars("company_context", context, 0, MAX_COMPANY_CONTEXT_CHARS)?;
        }

        let personality_id = request
            .personality_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PERSONALITY_ID.to_string());

        Ok(self
            .registry
            .create(
                request.candidate_name.trim(),
                request.target_role.trim(),
                request.company_context,
                personality_id,
            )
            .await)
    }

    /// Begin the interview and return the greeting.
    pub async fn start(&self, id: Uuid) -> InterviewResult<(Phase, String)> {
        let handle = self.session(id).await?;
        let mut session = handle.lock().await;
        Ok(self.machine.start(&mut session)?)
    }

    /// Run one candidate message through the pipeline.
    pub async fn process(&self, id: Uuid, text: &str) -> InterviewResult<ProcessOutcome> {
        if text.trim().is_empty() {
            return Err(InterviewError::BadRequest("Message text must not be empty".to_string()));
        }
        if self.length.enforce {
            self.guard
                .validate_length(text, self.length.min_words, self.length.max_words)
                .map_err(|e| InterviewError::BadRequest(e.to_string()))?;
        }

        let handle = self.session(id).await?;
        let mut session = handle.lock().await;
        let outcome = self.machine.process(&mut session, text).await?;

        tracing::debug!(
            session_id = %id,
            phase = %outcome.phase,
            degraded = outcome.degraded.is_some(),
            "Message processed"
        );
        Ok(outcome)
    }

    /// Finish the interview early. Safe to call repeatedly.
    pub async fn end(&self, id: Uuid) -> InterviewResult<Option<Evaluation>> {
        let handle = self.session(id).await?;
        let mut session = handle.lock().await;
        Ok(self.machine.end(&mut session)?)
    }

    pub async fn status(&self, id: Uuid) -> InterviewResult<SessionStatus> {
        let handle = self.session(id).await?;
        let session = handle.lock().await;
        Ok(SessionStatus::from(&*session))
    }

    pub async fn transcript(&self, id: Uuid) -> InterviewResult<Vec<TranscriptEntry>> {
        let handle = self.session(id).await?;
        let session = handle.lock().await;
        Ok(session.transcript().to_vec())
    }

    /// Recent exchanges for a candidate across sessions, oldest first.
    pub async fn candidate_history(
        &self,
        candidate_name: &str,
        limit: usize,
    ) -> InterviewResult<Vec<HistoryRecord>> {
        Ok(self.history.candidate_history(candidate_name, limit).await?)
    }

    /// Drop the recorded exchanges of a known session.
    pub async fn clear_history(&self, id: Uuid) -> InterviewResult<usize> {
        self.session(id).await?;
        let removed = self.history.clear_session(id).await?;
        tracing::info!(session_id = %id, removed, "Session history cleared");
        Ok(removed)
    }

    pub fn get_personality(&self, id: &str) -> InterviewResult<Personality> {
        self.personalities
            .get(id)
            .ok_or_else(|| InterviewError::NotFound(format!("Personality {} not found", id)))
    }

    /// Run the guard over `text` without touching any session.
    pub fn inspect(&self, text: &str) -> InspectReport {
        let filtered = self.guard.filter_input(text);
        let length = self
            .guard
            .validate_length(text, self.length.min_words, self.length.max_words);

        InspectReport {
            filtered: filtered.text,
            was_modified: filtered.was_modified,
            warnings: self.guard.warnings(text),
            length_ok: length.is_ok(),
            length_message: length.err().map(|e| e.to_string()),
        }
    }

    async fn session(&self, id: Uuid) -> InterviewResult<SessionHandle> {
        self.registry
            .get(id)
            .await
            .ok_or_else(|| InterviewError::session_not_found(id))
    }
}

fn check_chars(field: &str, value: &str, min: usize, max: usize) -> InterviewResult<()> {
    let len = value.trim().chars().count();
    if len < min || value.chars().count() > max {
        return Err(InterviewError::BadRequest(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(())
}
