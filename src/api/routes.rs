//! Route definitions for the API.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;
use crate::AppState;

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::create_session,
        handlers::start_session,
        handlers::send_message,
        handlers::end_session,
        handlers::get_status,
        handlers::get_transcript,
        handlers::get_candidate_history,
        handlers::clear_session_history,
        handlers::list_personalities,
        handlers::get_personality,
        handlers::create_personality,
        handlers::inspect_text,
        handlers::health_check,
    ),
    components(schemas(
        crate::api::types::CreateSessionRequest,
        crate::api::types::CreateSessionResponse,
        crate::api::types::StartSessionResponse,
        crate::api::types::SendMessageRequest,
        crate::api::types::SendMessageResponse,
        crate::api::types::EndSessionResponse,
        crate::api::types::TranscriptResponse,
        crate::api::types::HistoryQuery,
        crate::api::types::HistoryResponse,
        crate::api::types::ClearHistoryResponse,
        crate::api::types::PersonalitySummary,
        crate::api::types::ListPersonalitiesResponse,
        crate::api::types::InspectRequest,
        crate::api::types::HealthResponse,
        crate::domain::Phase,
        crate::domain::Speaker,
        crate::domain::TranscriptEntry,
        crate::domain::Evaluation,
        crate::domain::EvaluationFeedback,
        crate::domain::Personality,
        crate::domain::ToneParameters,
        crate::domain::BehaviorRules,
        crate::domain::PhasePrompts,
        crate::engine::SessionStatus,
        crate::engine::Degradation,
        crate::engine::InspectReport,
        crate::storage::HistoryRecord,
    )),
    tags(
        (name = "sessions", description = "Interview session lifecycle"),
        (name = "history", description = "Cross-session candidate history"),
        (name = "personalities", description = "Interviewer personas"),
        (name = "guard", description = "Content guard diagnostics"),
        (name = "health", description = "Health and status endpoints")
    ),
    info(
        title = "Interview Core API",
        version = "0.1.0",
        description = "Turn-based interview engine with content guardrails and deterministic scoring",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Sessions
        .route("/v1/sessions", post(handlers::create_session))
        .route("/v1/sessions/:id/start", post(handlers::start_session))
        .route("/v1/sessions/:id/messages", post(handlers::send_message))
        .route("/v1/sessions/:id/end", post(handlers::end_session))
        .route("/v1/sessions/:id/status", get(handlers::get_status))
        .route("/v1/sessions/:id/transcript", get(handlers::get_transcript))
        // History
        .route(
            "/v1/candidates/:name/history",
            get(handlers::get_candidate_history),
        )
        .route(
            "/v1/sessions/:id/history",
            delete(handlers::clear_session_history),
        )
        // Personalities
        .route(
            "/v1/personalities",
            get(handlers::list_personalities).post(handlers::create_personality),
        )
        .route("/v1/personalities/:id", get(handlers::get_personality))
        // Guard
        .route("/v1/guard/inspect", post(handlers::inspect_text))
        // Health
        .route("/v1/health", get(handlers::health_check))
        .with_state(state)
        // OpenAPI docs
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
