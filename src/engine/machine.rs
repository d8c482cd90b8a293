//! Session state machine.
//!
//! Drives one session through its phases and runs the message pipeline:
//!
//! ```text
//! candidate text
//!   -> ContentGuard::filter_input
//!   -> append candidate entry (tagged with the current phase)
//!   -> auto-transition when the phase's exchange limit is reached
//!   -> phase handler (Responder for Greeting/Technical, Scorer for Evaluation)
//!   -> ContentGuard::filter_output
//!   -> append interviewer entry
//!   -> HistoryStore::record
//! ```
//!
//! The machine holds no per-session state; callers pass the session in and
//! must serialize calls for the same session.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::guard::ContentGuard;
use super::personality::PersonalityCatalog;
use super::responder::{fallback_response, Responder};
use super::scorer::Scorer;
use crate::domain::{Evaluation, Personality, Phase, Session, Speaker, StateTransitionError};
use crate::storage::HistoryStore;

/// Set when the responder failed and a fallback reply was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Degradation {
    /// The failure was transient; asking again may get a real reply.
    pub retryable: bool,
    pub reason: String,
}

/// Result of processing one candidate message.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// Phase after the message was handled.
    pub phase: Phase,
    /// Interviewer reply, empty if the phase produced none.
    pub response: String,
    /// Present once the interview has been scored.
    pub evaluation: Option<Evaluation>,
    pub degraded: Option<Degradation>,
}

/// Phase logic shared by all sessions.
pub struct SessionStateMachine {
    guard: Arc<ContentGuard>,
    scorer: Arc<Scorer>,
    responder: Arc<dyn Responder>,
    history: Arc<dyn HistoryStore>,
    personalities: Arc<PersonalityCatalog>,
}

impl SessionStateMachine {
    pub fn new(
        guard: Arc<ContentGuard>,
        scorer: Arc<Scorer>,
        responder: Arc<dyn Responder>,
        history: Arc<dyn HistoryStore>,
        personalities: Arc<PersonalityCatalog>,
    ) -> Self {
        Self {
            guard,
            scorer,
            responder,
            history,
            personalities,
        }
    }

    /// Begin the interview: `Idle` -> `Greeting` plus the opening line.
    pub fn start(&self, session: &mut Session) -> Result<(Phase, String), StateTransitionError> {
        session.transition_to(Phase::Greeting)?;

        let personality = self.personalities.resolve(&session.personality_id);
        let greeting = greeting_text(session, &personality);
        session.append(Speaker::Interviewer, greeting.clone());

        tracing::info!(
            session_id = %session.id,
            personality_id = %personality.id,
            "Interview started"
        );

        Ok((session.phase(), greeting))
    }

    /// Handle one candidate message.
    ///
    /// Fails without touching the session when the current phase takes no
    /// candidate input (`Idle` or `Completed`).
    pub async fn process(
        &self,
        session: &mut Session,
        candidate_text: &str,
    ) -> Result<ProcessOutcome, StateTransitionError> {
        let phase = session.phase();
        if !phase.accepts_candidate_input() {
            // No transition out of this phase can handle a message.
            return Err(StateTransitionError {
                from: phase,
                to: phase,
            });
        }

        let filtered = self.guard.filter_input(candidate_text);
        if filtered.was_modified {
            tracing::info!(session_id = %session.id, %phase, "Candidate input was filtered");
        }

        session.append(Speaker::Candidate, filtered.text.clone());
        self.auto_transition(session)?;

        let (response, evaluation, degraded) = match session.phase() {
            Phase::Greeting | Phase::Technical => {
                let (response, degraded) = self.respond(session, &filtered.text).await;
                (response, None, degraded)
            }
            Phase::Evaluation => {
                let (closing, evaluation) = self.finish(session)?;
                (closing, Some(evaluation), None)
            }
            Phase::Idle | Phase::Completed => (String::new(), None, None),
        };

        let response = if response.is_empty() {
            response
        } else {
            let cleaned = self.guard.filter_output(&response).text;
            session.append(Speaker::Interviewer, cleaned.clone());
            self.record_exchange(session, &filtered.text, &cleaned).await;
            cleaned
        };

        Ok(ProcessOutcome {
            phase: session.phase(),
            response,
            evaluation,
            degraded,
        })
    }

    /// Force the interview to finish and return its evaluation.
    ///
    /// Idempotent: once the session is being or has been evaluated, the
    /// stored evaluation is returned without re-scoring.
    pub fn end(&self, session: &mut Session) -> Result<Option<Evaluation>, StateTransitionError> {
        let phase = session.phase();
        if phase == Phase::Evaluation || phase.is_terminal() {
            return Ok(session.evaluation().cloned());
        }

        while session.phase() != Phase::Evaluation {
            let from = session.phase();
            let next = from.successor().ok_or(StateTransitionError {
                from,
                to: Phase::Evaluation,
            })?;
            session.transition_to(next)?;
        }

        let (closing, evaluation) = self.finish(session)?;
        let closing = self.guard.filter_output(&closing).text;
        session.append(Speaker::Interviewer, closing);

        tracing::info!(session_id = %session.id, score = evaluation.score, "Interview ended early");
        Ok(Some(evaluation))
    }

    /// Advance when the current phase has received its quota of messages.
    ///
    /// `Evaluation` is left to its handler, which is the only way into
    /// `Completed`.
    fn auto_transition(&self, session: &mut Session) -> Result<(), StateTransitionError> {
        let phase = session.phase();
        if phase == Phase::Evaluation {
            return Ok(());
        }
        let Some(limit) = phase.exchange_limit() else {
            return Ok(());
        };

        let count = session.candidate_count_in(phase);
        if count >= limit {
            if let Some(next) = phase.successor() {
                tracing::debug!(session_id = %session.id, %phase, count, limit, "Exchange limit reached");
                session.transition_to(next)?;
            }
        }
        Ok(())
    }

    async fn respond(&self, session: &Session, latest: &str) -> (String, Option<Degradation>) {
        let personality = self.personalities.resolve(&session.personality_id);

        match self.responder.generate(session, &personality, latest).await {
            Ok(text) => (text, None),
            Err(e) => {
                let retryable = e.is_retryable();
                tracing::warn!(
                    session_id = %session.id,
                    phase = %session.phase(),
                    error = %e,
                    retryable,
                    "Responder failed, using fallback"
                );
                (
                    fallback_response(session.phase()).to_string(),
                    Some(Degradation {
                        retryable,
                        reason: e.to_string(),
                    }),
                )
            }
        }
    }

    /// Evaluation handler: score, store and enter `Completed`.
    fn finish(&self, session: &mut Session) -> Result<(String, Evaluation), StateTransitionError> {
        let evaluation = self.scorer.evaluate(session);
        session.complete(evaluation.clone())?;
        Ok((closing_text(session), evaluation))
    }

    async fn record_exchange(&self, session: &Session, candidate: &str, interviewer: &str) {
        if let Err(e) = self.history.record(session, candidate, interviewer).await {
            tracing::warn!(session_id = %session.id, error = %e, "Failed to record exchange");
        }
    }
}

fn greeting_text(session: &Session, personality: &Personality) -> String {
    format!(
        "Hello {candidate}! I'm {interviewer}, and I'll be your interviewer today for the \
         {role} position. {directive} Before we begin, could you briefly introduce yourself \
         and tell me what interests you about this role?",
        candidate = session.candidate_name,
        interviewer = personality.name,
        role = session.target_role,
        directive = personality.phase_prompts.greeting,
    )
}

fn closing_text(session: &Session) -> String {
    format!(
        "Thank you for your time today, {}. We've completed the interview. \
         You'll receive your results shortly.",
        session.candidate_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GuardConfig, ScoringConfig};
    use crate::domain::DEFAULT_PERSONALITY_ID;
    use crate::engine::responder::{ResponderError, TemplateResponder};
    use crate::storage::{HistoryError, HistoryRecord, InMemoryHistoryStore};
    use async_trait::async_trait;
    use uuid::Uuid;

    struct FixedResponder(&'static str);

    #[async_trait]
    impl Responder for FixedResponder {
        async fn generate(
            &self,
            _session: &Session,
            _personality: &Personality,
            _latest: &str,
        ) -> Result<String, ResponderError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingResponder {
        retryable: bool,
    }

    #[async_trait]
    impl Responder for FailingResponder {
        async fn generate(
            &self,
            _session: &Session,
            _personality: &Personality,
            _latest: &str,
        ) -> Result<String, ResponderError> {
            if self.retryable {
                Err(ResponderError::Timeout)
            } else {
                Err(ResponderError::Api {
                    status: 401,
                    body: "bad key".to_string(),
                })
            }
        }
    }

    struct FailingHistory;

    #[async_trait]
    impl HistoryStore for FailingHistory {
        async fn record(&self, _: &Session, _: &str, _: &str) -> Result<(), HistoryError> {
            Err(HistoryError::Corrupt("disk full".to_string()))
        }

        async fn candidate_history(&self, _: &str, _: usize) -> Result<Vec<HistoryRecord>, HistoryError> {
            Err(HistoryError::Corrupt("disk full".to_string()))
        }

        async fn clear_session(&self, _: Uuid) -> Result<usize, HistoryError> {
            Ok(0)
        }
    }

    fn build_machine(
        responder: Arc<dyn Responder>,
        history: Arc<dyn HistoryStore>,
    ) -> SessionStateMachine {
        crate::logging::init_test();
        SessionStateMachine::new(
            Arc::new(ContentGuard::new(&GuardConfig::default()).unwrap()),
            Arc::new(Scorer::new(ScoringConfig::default())),
            responder,
            history,
            Arc::new(PersonalityCatalog::new()),
        )
    }

    fn default_machine() -> SessionStateMachine {
        build_machine(
            Arc::new(TemplateResponder::new()),
            Arc::new(InMemoryHistoryStore::new()),
        )
    }

    fn make_session() -> Session {
        Session::new("Ada Lovelace", "Software Engineer", None, DEFAULT_PERSONALITY_ID)
    }

    #[test]
    fn test_start_greets_and_enters_greeting() {
        let machine = default_machine();
        let mut session = make_session();

        let (phase, greeting) = machine.start(&mut session).unwrap();
        assert_eq!(phase, Phase::Greeting);
        assert!(greeting.starts_with("Hello Ada Lovelace! I'm Sarah"));
        assert!(greeting.contains("Software Engineer position"));
        assert!(greeting.contains("Warmly greet the candidate"));
        assert!(greeting.ends_with("what interests you about this role?"));

        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].speaker, Speaker::Interviewer);
        assert_eq!(session.transcript()[0].phase, Phase::Greeting);
    }

    #[test]
    fn test_start_twice_fails() {
        let machine = default_machine();
        let mut session = make_session();
        machine.start(&mut session).unwrap();

        let err = machine.start(&mut session).unwrap_err();
        assert_eq!(err.from, Phase::Greeting);
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn test_unknown_personality_uses_default() {
        let machine = default_machine();
        let mut session = Session::new("Ada", "Engineer", None, "no-such-persona");
        let (_, greeting) = machine.start(&mut session).unwrap();
        assert!(greeting.contains("I'm Sarah"));
    }

    #[tokio::test]
    async fn test_greeting_advances_after_three_messages() {
        let machine = default_machine();
        let mut session = make_session();
        machine.start(&mut session).unwrap();

        for _ in 0..2 {
            let outcome = machine.process(&mut session, "Hello, nice to meet you.").await.unwrap();
            assert_eq!(outcome.phase, Phase::Greeting);
        }

        let outcome = machine.process(&mut session, "I build compilers.").await.unwrap();
        assert_eq!(outcome.phase, Phase::Technical);
        assert!(outcome.evaluation.is_none());

        // The third message was spoken during Greeting; the reply during Technical.
        let transcript = session.transcript();
        let last_two = &transcript[transcript.len() - 2..];
        assert_eq!(last_two[0].speaker, Speaker::Candidate);
        assert_eq!(last_two[0].phase, Phase::Greeting);
        assert_eq!(last_two[1].speaker, Speaker::Interviewer);
        assert_eq!(last_two[1].phase, Phase::Technical);
    }

    #[tokio::test]
    async fn test_full_interview_phases_are_monotonic() {
        let machine = default_machine();
        let mut session = make_session();
        let mut phases = vec![session.phase()];
        machine.start(&mut session).unwrap();
        phases.push(session.phase());

        let mut final_outcome = None;
        for i in 0..13 {
            let outcome = machine
                .process(&mut session, &format!("Answer number {} about my project.", i))
                .await
                .unwrap();
            phases.push(outcome.phase);
            final_outcome = Some(outcome);
        }

        // One call may cross several phases (Technical -> Evaluation -> Completed),
        // so each observed change must be reachable along the successor chain.
        for pair in phases.windows(2) {
            assert!(pair[0] <= pair[1]);
            let mut phase = pair[0];
            while phase != pair[1] {
                let next = phase.successor().unwrap();
                assert!(phase.can_transition_to(next));
                phase = next;
            }
        }
        assert_eq!(
            phases.iter().filter(|p| **p == Phase::Technical).count(),
            10,
            "ten messages are answered in the technical phase"
        );

        // 3 greeting + 10 technical messages complete the interview.
        let outcome = final_outcome.unwrap();
        assert_eq!(outcome.phase, Phase::Completed);
        let evaluation = outcome.evaluation.unwrap();
        assert_eq!(session.evaluation(), Some(&evaluation));
        assert!(outcome.response.starts_with("Thank you for your time today, Ada Lovelace."));

        let last = session.transcript().last().unwrap();
        assert_eq!(last.speaker, Speaker::Interviewer);
        assert_eq!(last.phase, Phase::Completed);
    }

    #[tokio::test]
    async fn test_process_rejected_when_idle_or_completed() {
        let machine = default_machine();
        let mut session = make_session();

        let err = machine.process(&mut session, "Hello").await.unwrap_err();
        assert_eq!(err.from, Phase::Idle);
        assert!(session.transcript().is_empty());

        machine.start(&mut session).unwrap();
        machine.end(&mut session).unwrap();
        let before = session.transcript().len();

        let err = machine.process(&mut session, "One more thing").await.unwrap_err();
        assert_eq!(err.from, Phase::Completed);
        assert_eq!(session.transcript().len(), before);
    }

    #[tokio::test]
    async fn test_end_is_idempotent() {
        let machine = default_machine();
        let mut session = make_session();
        machine.start(&mut session).unwrap();
        machine
            .process(&mut session, "Hi, I designed and tested a database engine.")
            .await
            .unwrap();

        let first = machine.end(&mut session).unwrap().unwrap();
        let transcript_len = session.transcript().len();
        let second = machine.end(&mut session).unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(session.phase(), Phase::Completed);
        assert_eq!(session.transcript().len(), transcript_len);
    }

    #[test]
    fn test_end_from_idle_yields_empty_evaluation() {
        let machine = default_machine();
        let mut session = make_session();

        let evaluation = machine.end(&mut session).unwrap().unwrap();
        assert_eq!(evaluation, Evaluation::empty());
        assert_eq!(session.phase(), Phase::Completed);
    }

    #[tokio::test]
    async fn test_responder_failure_degrades_to_fallback() {
        for retryable in [true, false] {
            let machine = build_machine(
                Arc::new(FailingResponder { retryable }),
                Arc::new(InMemoryHistoryStore::new()),
            );
            let mut session = make_session();
            machine.start(&mut session).unwrap();

            let outcome = machine.process(&mut session, "Hello there").await.unwrap();
            assert_eq!(outcome.response, fallback_response(Phase::Greeting));
            let degraded = outcome.degraded.unwrap();
            assert_eq!(degraded.retryable, retryable);

            // Candidate entry and fallback reply are both in the transcript.
            assert_eq!(session.transcript().len(), 3);
            assert_eq!(session.transcript()[1].text, "Hello there");
        }
    }

    #[tokio::test]
    async fn test_history_failure_is_swallowed() {
        let machine = build_machine(Arc::new(TemplateResponder::new()), Arc::new(FailingHistory));
        let mut session = make_session();
        machine.start(&mut session).unwrap();

        let outcome = machine.process(&mut session, "Hello there").await.unwrap();
        assert_eq!(outcome.phase, Phase::Greeting);
        assert!(outcome.degraded.is_none());
        assert!(!outcome.response.is_empty());
    }

    #[tokio::test]
    async fn test_input_and_output_are_filtered() {
        let history = Arc::new(InMemoryHistoryStore::new());
        let machine = build_machine(Arc::new(FixedResponder("Great answer!!! 🎉")), history.clone());
        let mut session = make_session();
        machine.start(&mut session).unwrap();

        let outcome = machine
            .process(&mut session, "Contact me at a@b.com or 555-123-4567")
            .await
            .unwrap();
        assert_eq!(outcome.response, "Great answer!");

        let candidate = session.transcript()[1].text.as_str();
        assert!(!candidate.contains("a@b.com"));
        assert!(candidate.contains("[REDACTED_EMAIL]"));
        assert!(candidate.contains("[REDACTED_PHONE]"));

        let recorded = history.candidate_history("Ada Lovelace", 10).await.unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].candidate_message, candidate);
        assert_eq!(recorded[0].interviewer_response, "Great answer!");
    }
}
