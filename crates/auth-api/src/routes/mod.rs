//! Route definitions
//!
//! Auth routes are mounted under /api/v1; health routes stay at the root.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{auth, health};
use crate::state::AppState;

/// API router (excluding health, which skips rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", auth_routes())
}

/// Liveness and readiness probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/logout-all", post(auth::logout_all))
        .route("/auth/me", get(auth::me))
        .route("/auth/verify", post(auth::verify))
        .route("/auth/revoke", post(auth::revoke))
}
