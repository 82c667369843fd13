//! coursehub-server library - HTTP API for the CourseHub learning platform
//!
//! Routes are grouped per area in [`api`]; authentication is a bearer-token
//! extractor ([`api::AuthUser`]) so public and protected handlers share one
//! router.

use axum::Router;
use coursehub_common::progress::ProgressTracker;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Lesson completion and progress queries
    pub tracker: ProgressTracker,
    /// Lifetime of newly issued session tokens
    pub session_ttl: chrono::Duration,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, session_ttl_hours: i64) -> Self {
        Self {
            tracker: ProgressTracker::new(db.clone()),
            db,
            session_ttl: chrono::Duration::hours(session_ttl_hours),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::account_routes())
        .merge(api::catalog_routes())
        .merge(api::enrollment_routes())
        .merge(api::progress_routes())
        .merge(api::community_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router with a permissive CORS policy for browser front-ends served elsewhere
pub fn build_router_with_cors(state: AppState) -> Router {
    build_router(state).layer(CorsLayer::permissive())
}
