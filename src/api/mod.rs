//! HTTP API layer for Interview Core.
//!
//! Provides REST endpoints for the interview session lifecycle.

pub mod handlers;
mod routes;
mod types;

pub use routes::build_router;
