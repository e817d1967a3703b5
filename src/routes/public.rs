use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that never look at a credential.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Returns service status and crate version for load balancer checks.
        .route("/health", get(handlers::health))
}
