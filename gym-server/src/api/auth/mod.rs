//! Authentication Routes

mod handler;

use axum::{Router, routing::get, routing::post, routing::put};

use crate::core::ServerState;

/// Build authentication router
/// - register / login / forgot-password / reset-password: public (no auth required)
/// - me / update-password: protected (auth middleware handled at Router level)
pub fn router() -> Router<ServerState> {
    Router::new()
        // Public routes - no auth middleware applied
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/forgot-password", post(handler::forgot_password))
        .route(
            "/api/auth/reset-password/{token}",
            put(handler::reset_password),
        )
        // Protected routes - require authentication (handled by global require_auth middleware)
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/update-password", put(handler::update_password))
}
