//! Interview session aggregate.
//!
//! A session owns its phase, its transcript and at most one evaluation.
//! All mutation goes through methods here so that:
//! - the phase only moves along the transition table,
//! - every entry is tagged with the phase active when it was appended,
//! - the evaluation is set exactly once, on entering `Completed`,
//! - `updated_at` is refreshed on every append or phase change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Evaluation, Phase, Speaker, StateTransitionError, TranscriptEntry};

/// Default personality used when none is requested.
pub const DEFAULT_PERSONALITY_ID: &str = "default";

/// A single interview conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,

    /// Candidate display name.
    pub candidate_name: String,

    /// Role the candidate is interviewing for.
    pub target_role: String,

    /// Optional company background supplied at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_context: Option<String>,

    /// Interviewer persona.
    pub personality_id: String,

    phase: Phase,
    transcript: Vec<TranscriptEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evaluation: Option<Evaluation>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new idle session.
    pub fn new(
        candidate_name: impl Into<String>,
        target_role: impl Into<String>,
        company_context: Option<String>,
        personality_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            candidate_name: candidate_name.into(),
            target_role: target_role.into(),
            company_context,
            personality_id: personality_id.into(),
            phase: Phase::Idle,
            transcript: Vec::new(),
            evaluation: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn evaluation(&self) -> Option<&Evaluation> {
        self.evaluation.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move to `target` if the transition table allows it.
    ///
    /// `Completed` can only be entered through [`Session::complete`].
    pub fn transition_to(&mut self, target: Phase) -> Result<(), StateTransitionError> {
        if target == Phase::Completed {
            return Err(StateTransitionError {
                from: self.phase,
                to: target,
            });
        }
        self.apply_transition(target)
    }

    /// Store the evaluation and enter `Completed`.
    ///
    /// Only valid from `Evaluation`; since `Completed` is terminal this can
    /// succeed at most once.
    pub fn complete(&mut self, evaluation: Evaluation) -> Result<(), StateTransitionError> {
        self.apply_transition(Phase::Completed)?;
        self.evaluation = Some(evaluation);
        Ok(())
    }

    fn apply_transition(&mut self, target: Phase) -> Result<(), StateTransitionError> {
        let next = self.phase.transition_to(target)?;
        tracing::info!(
            session_id = %self.id,
            from = %self.phase,
            to = %next,
            "Phase transition"
        );
        self.phase = next;
        self.touch();
        Ok(())
    }

    /// Append an utterance tagged with the current phase.
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) -> &TranscriptEntry {
        self.transcript
            .push(TranscriptEntry::new(speaker, text, self.phase));
        self.touch();
        // Just pushed, so the transcript is non-empty.
        &self.transcript[self.transcript.len() - 1]
    }

    /// Candidate-authored entries in transcript order.
    pub fn candidate_entries(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.transcript.iter().filter(|e| e.is_candidate())
    }

    /// Number of candidate entries tagged with `phase`.
    pub fn candidate_count_in(&self, phase: Phase) -> usize {
        self.candidate_entries().filter(|e| e.phase == phase).count()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session() -> Session {
        Session::new("Ada Lovelace", "Software Engineer", None, DEFAULT_PERSONALITY_ID)
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = make_session();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.transcript().is_empty());
        assert!(session.evaluation().is_none());
        assert_eq!(session.created_at(), session.updated_at());
    }

    #[test]
    fn test_append_tags_current_phase() {
        let mut session = make_session();
        session.transition_to(Phase::Greeting).unwrap();
        session.append(Speaker::Interviewer, "Hello");
        session.append(Speaker::Candidate, "Hi there");
        session.transition_to(Phase::Technical).unwrap();
        let entry = session.append(Speaker::Candidate, "I write Rust");
        assert_eq!(entry.phase, Phase::Technical);

        assert_eq!(session.candidate_count_in(Phase::Greeting), 1);
        assert_eq!(session.candidate_count_in(Phase::Technical), 1);
        assert_eq!(session.candidate_entries().count(), 2);
        assert_eq!(session.transcript()[2].text, "I write Rust");
        assert_eq!(session.transcript()[0].phase, Phase::Greeting);
    }

    #[test]
    fn test_updated_at_refreshes() {
        let mut session = make_session();
        let before = session.updated_at();
        session.transition_to(Phase::Greeting).unwrap();
        assert!(session.updated_at() >= before);
    }

    #[test]
    fn test_completed_only_via_complete() {
        let mut session = make_session();
        session.transition_to(Phase::Greeting).unwrap();
        session.transition_to(Phase::Technical).unwrap();
        session.transition_to(Phase::Evaluation).unwrap();

        let err = session.transition_to(Phase::Completed).unwrap_err();
        assert_eq!(err.to, Phase::Completed);
        assert_eq!(session.phase(), Phase::Evaluation);

        session.complete(Evaluation::empty()).unwrap();
        assert_eq!(session.phase(), Phase::Completed);
        assert!(session.evaluation().is_some());

        // Terminal: a second completion is rejected and leaves the result alone.
        assert!(session.complete(Evaluation::empty()).is_err());
    }

    #[test]
    fn test_complete_rejected_outside_evaluation() {
        let mut session = make_session();
        session.transition_to(Phase::Greeting).unwrap();
        assert!(session.complete(Evaluation::empty()).is_err());
        assert!(session.evaluation().is_none());
        assert_eq!(session.phase(), Phase::Greeting);
    }

    #[test]
    fn test_invalid_transition_leaves_session_untouched() {
        let mut session = make_session();
        let err = session.transition_to(Phase::Technical).unwrap_err();
        assert_eq!(err.from, Phase::Idle);
        assert_eq!(session.phase(), Phase::Idle);
    }
}
