//! Database models for Interview Core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::HistoryError;
use crate::domain::Session;

/// One recorded candidate/interviewer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryRecord {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub target_role: String,
    pub candidate_message: String,
    pub interviewer_response: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(session: &Session, candidate_message: &str, interviewer_response: &str) -> Self {
        Self {
            session_id: session.id,
            candidate_name: session.candidate_name.clone(),
            target_role: session.target_role.clone(),
            candidate_message: candidate_message.to_string(),
            interviewer_response: interviewer_response.to_string(),
            recorded_at: Utc::now(),
        }
    }
}

/// Database row for the exchanges table.
#[derive(Debug, Clone, FromRow)]
pub struct ExchangeRow {
    pub session_id: String,
    pub candidate_name: String,
    pub target_role: String,
    pub candidate_message: String,
    pub interviewer_response: String,
    pub recorded_at: String,
}

impl TryFrom<ExchangeRow> for HistoryRecord {
    type Error = HistoryError;

    fn try_from(row: ExchangeRow) -> Result<Self, Self::Error> {
        Ok(HistoryRecord {
            session_id: Uuid::parse_str(&row.session_id)
                .map_err(|e| HistoryError::Corrupt(e.to_string()))?,
            candidate_name: row.candidate_name,
            target_role: row.target_role,
            candidate_message: row.candidate_message,
            interviewer_response: row.interviewer_response,
            recorded_at: DateTime::parse_from_rfc3339(&row.recorded_at)
                .map_err(|e| HistoryError::Corrupt(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}
