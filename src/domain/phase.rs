//! Interview phases and the transition table between them.
//!
//! Phases advance strictly forward:
//! `Idle` → `Greeting` → `Technical` → `Evaluation` → `Completed`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A named stage of the interview state machine.
///
/// The derived ordering is the order of progression.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Session created, interview not started.
    Idle,
    /// Introductions.
    Greeting,
    /// Technical questioning.
    Technical,
    /// Transcript is being scored.
    Evaluation,
    /// Terminal phase; the evaluation is available.
    Completed,
}

/// Raised when a transition outside the table is attempted.
///
/// This is a contract violation inside the engine, never a user error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid phase transition from {from} to {to}")]
pub struct StateTransitionError {
    pub from: Phase,
    pub to: Phase,
}

impl Phase {
    /// Allowed destinations from this phase.
    pub fn valid_transitions(&self) -> &'static [Phase] {
        match self {
            Phase::Idle => &[Phase::Greeting],
            Phase::Greeting => &[Phase::Technical],
            Phase::Technical => &[Phase::Evaluation],
            Phase::Evaluation => &[Phase::Completed],
            Phase::Completed => &[],
        }
    }

    pub fn can_transition_to(&self, target: Phase) -> bool {
        self.valid_transitions().contains(&target)
    }

    /// Validated transition, returning the new phase.
    pub fn transition_to(&self, target: Phase) -> Result<Phase, StateTransitionError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(StateTransitionError {
                from: *self,
                to: target,
            })
        }
    }

    /// The single next phase, if any.
    pub fn successor(&self) -> Option<Phase> {
        self.valid_transitions().first().copied()
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Number of candidate messages after which the phase is exhausted.
    ///
    /// `Idle` is pre-conversation and `Completed` is terminal, so neither
    /// has a limit.
    pub fn exchange_limit(&self) -> Option<usize> {
        match self {
            Phase::Greeting => Some(3),
            Phase::Technical => Some(10),
            Phase::Evaluation => Some(1),
            Phase::Idle | Phase::Completed => None,
        }
    }

    /// Whether candidate messages are accepted in this phase.
    pub fn accepts_candidate_input(&self) -> bool {
        matches!(self, Phase::Greeting | Phase::Technical | Phase::Evaluation)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Greeting => write!(f, "greeting"),
            Phase::Technical => write!(f, "technical"),
            Phase::Evaluation => write!(f, "evaluation"),
            Phase::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(Phase::Idle),
            "greeting" => Ok(Phase::Greeting),
            "technical" => Ok(Phase::Technical),
            "evaluation" => Ok(Phase::Evaluation),
            "completed" => Ok(Phase::Completed),
            _ => Err(format!("Unknown phase: {}", s)),
        }
    }
}
