//! Transcript entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Phase;

/// Who authored an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Interviewer => write!(f, "interviewer"),
            Speaker::Candidate => write!(f, "candidate"),
        }
    }
}

/// One timestamped, speaker-attributed, phase-tagged utterance.
///
/// Entries are built only by [`Session`](super::Session) and never change
/// after being appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TranscriptEntry {
    /// Unique identifier for this entry.
    pub id: Uuid,
    /// Author of the utterance.
    pub speaker: Speaker,
    /// Already-filtered text.
    pub text: String,
    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
    /// Phase active when the entry was spoken.
    pub phase: Phase,
}

impl TranscriptEntry {
    pub(crate) fn new(speaker: Speaker, text: impl Into<String>, phase: Phase) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            text: text.into(),
            created_at: Utc::now(),
            phase,
        }
    }

    pub fn is_candidate(&self) -> bool {
        self.speaker == Speaker::Candidate
    }

    /// Whitespace-delimited word count.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
