//! Interview Core - turn-based interview engine
//!
//! This service runs candidate interviews through a fixed sequence of
//! phases, sanitizing every message and scoring the finished transcript.

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use tokio::net::TcpListener;

mod api;
mod config;
mod domain;
mod engine;
mod error;
mod logging;
mod storage;

use crate::api::build_router;
use crate::config::{Config, HistoryBackend, ResponderConfig};
use crate::engine::{
    ContentGuard, InterviewCoordinator, LlmResponder, PersonalityCatalog, Responder, Scorer,
    TemplateResponder,
};
use crate::storage::{HistoryStore, InMemoryHistoryStore, SqliteHistoryStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The interview coordinator.
    pub coordinator: Arc<InterviewCoordinator>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        // Missing .env is expected in production
        eprintln!("Note: No .env file loaded ({e})");
    }

    logging::init();

    tracing::info!("Starting Interview Core v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        history = ?config.history.backend,
        responder_enabled = config.responder.enabled,
        passing_score = config.scoring.passing_score,
        "Configuration loaded"
    );

    let guard = Arc::new(ContentGuard::new(&config.guard).map_err(|e| {
        tracing::error!(error = %e, "Invalid guard configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?);

    let scorer = Arc::new(Scorer::new(config.scoring.clone()));
    let responder = build_responder(&config.responder)?;
    let history = build_history(&config).await?;

    let personalities = Arc::new(PersonalityCatalog::new());
    if let Some(dir) = &config.personalities.directory {
        let loaded = personalities.load_directory(dir)?;
        tracing::info!(directory = %dir.display(), loaded, "Custom personalities loaded");
    }

    let coordinator = Arc::new(InterviewCoordinator::new(
        guard,
        &config.guard,
        scorer,
        responder,
        history,
        personalities,
    ));

    let app = build_router(AppState { coordinator });

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_responder(config: &ResponderConfig) -> anyhow::Result<Arc<dyn Responder>> {
    if !config.enabled {
        tracing::info!("LLM responder disabled, using template replies");
        return Ok(Arc::new(TemplateResponder::new()));
    }

    let responder = LlmResponder::new(config.clone()).map_err(|e| {
        tracing::error!(error = %e, "Failed to configure LLM responder");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;
    tracing::info!(model = %config.model, base_url = %config.base_url, "LLM responder enabled");
    Ok(Arc::new(responder))
}

async fn build_history(config: &Config) -> anyhow::Result<Arc<dyn HistoryStore>> {
    match config.history.backend {
        HistoryBackend::Memory => Ok(Arc::new(InMemoryHistoryStore::new())),
        HistoryBackend::Sqlite => {
            let pool = SqlitePool::connect(&config.history.database_url)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to connect to database");
                    anyhow::anyhow!("Database connection error: {}", e)
                })?;

            let store = SqliteHistoryStore::new(pool);
            store.init_schema().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to initialize database schema");
                anyhow::anyhow!("Schema initialization error: {}", e)
            })?;

            tracing::info!("Database connected and schema initialized");
            Ok(Arc::new(store))
        }
    }
}
