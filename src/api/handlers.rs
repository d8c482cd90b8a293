//! HTTP request handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::types::*;
use crate::domain::Personality;
use crate::engine::{InspectReport, NewSession, SessionStatus};
use crate::error::InterviewResult;
use crate::AppState;

/// Upper bound for history queries.
const MAX_HISTORY_LIMIT: usize = 100;

// ==================== Sessions ====================

/// Create a new interview session.
///
/// POST /v1/sessions
#[utoipa::path(
    post,
    path = "/v1/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = CreateSessionResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "sessions"
)]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> InterviewResult<(StatusCode, Json<CreateSessionResponse>)> {
    let session = state
        .coordinator
        .create_session(NewSession {
            candidate_name: request.candidate_name,
            target_role: request.target_role,
            company_context: request.company_context,
            personality_id: request.personality_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
            phase: session.phase(),
            personality_id: session.personality_id.clone(),
            created_at: session.created_at(),
        }),
    ))
}

/// Start the interview and receive the greeting.
///
/// POST /v1/sessions/{id}/start
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/start",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Interview started", body = StartSessionResponse),
        (status = 404, description = "Session not found"),
        (status = 500, description = "Session already started")
    ),
    tag = "sessions"
)]
pub async fn start_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> InterviewResult<Json<StartSessionResponse>> {
    let (phase, message) = state.coordinator.start(id).await?;

    Ok(Json(StartSessionResponse {
        session_id: id,
        phase,
        message,
    }))
}

/// Send a candidate message.
///
/// POST /v1/sessions/{id}/messages
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/messages",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message processed", body = SendMessageResponse),
        (status = 400, description = "Empty or out-of-bounds message"),
        (status = 404, description = "Session not found"),
        (status = 500, description = "Session not accepting messages")
    ),
    tag = "sessions"
)]
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendMessageRequest>,
) -> InterviewResult<Json<SendMessageResponse>> {
    let outcome = state.coordinator.process(id, &request.text).await?;

    Ok(Json(SendMessageResponse {
        phase: outcome.phase,
        response: outcome.response,
        evaluation: outcome.evaluation,
        degraded: outcome.degraded,
    }))
}

/// End the interview early and get the evaluation.
///
/// POST /v1/sessions/{id}/end
#[utoipa::path(
    post,
    path = "/v1/sessions/{id}/end",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Interview ended", body = EndSessionResponse),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> InterviewResult<Json<EndSessionResponse>> {
    let evaluation = state.coordinator.end(id).await?;

    tracing::info!(
        session_id = %id,
        score = ?evaluation.as_ref().map(|e| e.score),
        "Session ended"
    );

    Ok(Json(EndSessionResponse {
        session_id: id,
        evaluation,
    }))
}

/// Get the current state of a session.
///
/// GET /v1/sessions/{id}/status
#[utoipa::path(
    get,
    path = "/v1/sessions/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session status", body = SessionStatus),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> InterviewResult<Json<SessionStatus>> {
    Ok(Json(state.coordinator.status(id).await?))
}

/// Get the full transcript of a session.
///
/// GET /v1/sessions/{id}/transcript
#[utoipa::path(
    get,
    path = "/v1/sessions/{id}/transcript",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session transcript", body = TranscriptResponse),
        (status = 404, description = "Session not found")
    ),
    tag = "sessions"
)]
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> InterviewResult<Json<TranscriptResponse>> {
    let entries = state.coordinator.transcript(id).await?;
    Ok(Json(TranscriptResponse {
        session_id: id,
        entries,
    }))
}

// ==================== Candidate history ====================

/// Recent exchanges recorded for a candidate.
///
/// GET /v1/candidates/{name}/history
#[utoipa::path(
    get,
    path = "/v1/candidates/{name}/history",
    params(
        ("name" = String, Path, description = "Candidate name"),
        ("limit" = Option<usize>, Query, description = "Maximum results (default 10)")
    ),
    responses(
        (status = 200, description = "Candidate history", body = HistoryResponse),
        (status = 500, description = "Internal error")
    ),
    tag = "history"
)]
pub async fn get_candidate_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> InterviewResult<Json<HistoryResponse>> {
    let limit = query.limit.clamp(1, MAX_HISTORY_LIMIT);
    let exchanges = state.coordinator.candidate_history(&name, limit).await?;

    Ok(Json(HistoryResponse {
        candidate_name: name,
        exchanges,
    }))
}

/// Remove a session's exchanges from the history store.
///
/// DELETE /v1/sessions/{id}/history
#[utoipa::path(
    delete,
    path = "/v1/sessions/{id}/history",
    params(
        ("id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "History cleared", body = ClearHistoryResponse),
        (status = 404, description = "Session not found")
    ),
    tag = "history"
)]
pub async fn clear_session_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> InterviewResult<Json<ClearHistoryResponse>> {
    let removed = state.coordinator.clear_history(id).await?;

    Ok(Json(ClearHistoryResponse {
        session_id: id,
        removed,
    }))
}

// ==================== Personalities ====================

/// List available interviewer personas.
///
/// GET /v1/personalities
#[utoipa::path(
    get,
    path = "/v1/personalities",
    responses(
        (status = 200, description = "Available personas", body = ListPersonalitiesResponse)
    ),
    tag = "personalities"
)]
pub async fn list_personalities(State(state): State<AppState>) -> Json<ListPersonalitiesResponse> {
    let personalities = state
        .coordinator
        .personalities()
        .list()
        .into_iter()
        .map(PersonalitySummary::from)
        .collect();

    Json(ListPersonalitiesResponse { personalities })
}

/// Get a persona by id.
///
/// GET /v1/personalities/{id}
#[utoipa::path(
    get,
    path = "/v1/personalities/{id}",
    params(
        ("id" = String, Path, description = "Personality ID")
    ),
    responses(
        (status = 200, description = "Persona", body = Personality),
        (status = 404, description = "Personality not found")
    ),
    tag = "personalities"
)]
pub async fn get_personality(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> InterviewResult<Json<Personality>> {
    Ok(Json(state.coordinator.get_personality(&id)?))
}

/// Register a custom persona.
///
/// POST /v1/personalities
#[utoipa::path(
    post,
    path = "/v1/personalities",
    request_body = Personality,
    responses(
        (status = 201, description = "Persona registered", body = Personality),
        (status = 400, description = "Invalid persona"),
        (status = 409, description = "Personality id already exists")
    ),
    tag = "personalities"
)]
pub async fn create_personality(
    State(state): State<AppState>,
    Json(personality): Json<Personality>,
) -> InterviewResult<(StatusCode, Json<Personality>)> {
    state
        .coordinator
        .personalities()
        .register(personality.clone())?;

    Ok((StatusCode::CREATED, Json(personality)))
}

// ==================== Guard ====================

/// Run the content guard over a text without affecting any session.
///
/// POST /v1/guard/inspect
#[utoipa::path(
    post,
    path = "/v1/guard/inspect",
    request_body = InspectRequest,
    responses(
        (status = 200, description = "Guard report", body = InspectReport)
    ),
    tag = "guard"
)]
pub async fn inspect_text(
    State(state): State<AppState>,
    Json(request): Json<InspectRequest>,
) -> Json<InspectReport> {
    Json(state.coordinator.inspect(&request.text))
}

// ==================== Health ====================

/// Health check endpoint.
///
/// GET /v1/health
#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_sessions: state.coordinator.session_count().await,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
