//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Evaluation, Personality, Phase, TranscriptEntry};
use crate::engine::Degradation;
use crate::storage::HistoryRecord;

// ==================== Sessions ====================

/// Request to create an interview session.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    /// Candidate display name (1-100 characters).
    pub candidate_name: String,
    /// Role being interviewed for (1-200 characters).
    pub target_role: String,
    /// Optional company background (up to 2000 characters).
    #[serde(default)]
    pub company_context: Option<String>,
    /// Interviewer persona; defaults to "default".
    #[serde(default)]
    pub personality_id: Option<String>,
}

/// Response after creating a session.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub phase: Phase,
    pub personality_id: String,
    pub created_at: DateTime<Utc>,
}

/// Response after starting a session.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartSessionResponse {
    pub session_id: Uuid,
    pub phase: Phase,
    /// Interviewer greeting.
    pub message: String,
}

/// A candidate message.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub text: String,
}

/// Interviewer reply to a candidate message.
#[derive(Debug, Serialize, ToSchema)]
pub struct SendMessageResponse {
    pub phase: Phase,
    /// Interviewer reply; empty if none was produced.
    pub response: String,
    /// Set when the interview finished with this message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
    /// Set when a fallback reply was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<Degradation>,
}

/// Response after ending a session.
#[derive(Debug, Serialize, ToSchema)]
pub struct EndSessionResponse {
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,
}

/// Response after clearing a session's recorded exchanges.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearHistoryResponse {
    pub session_id: Uuid,
    pub removed: usize,
}

/// Full transcript of a session.
#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptResponse {
    pub session_id: Uuid,
    pub entries: Vec<TranscriptEntry>,
}

// ==================== Candidate history ====================

/// Query parameters for candidate history.
#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryQuery {
    /// Maximum number of exchanges.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

/// Recent exchanges for a candidate.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub candidate_name: String,
    pub exchanges: Vec<HistoryRecord>,
}

// ==================== Personalities ====================

/// Persona listing entry.
#[derive(Debug, Serialize, ToSchema)]
pub struct PersonalitySummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<Personality> for PersonalitySummary {
    fn from(p: Personality) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
        }
    }
}

/// Available personas.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListPersonalitiesResponse {
    pub personalities: Vec<PersonalitySummary>,
}

// ==================== Guard ====================

/// Text to inspect.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InspectRequest {
    pub text: String,
}

// ==================== Health ====================

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Sessions held in memory.
    pub active_sessions: usize,
    /// Timestamp.
    pub timestamp: String,
}
