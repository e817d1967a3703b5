use axum::{Router, extract::FromRef, http::HeaderName};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Request pipeline stages, in the order a request flows through them.
pub mod extract;
pub mod auth;
pub mod policy;
pub mod storage;

// Service plumbing.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

// Module for routing segregation (Public, Media).
pub mod routes;
use routes::{media, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::GatewayError;
pub use storage::{LocalMediaStore, MediaStoreState, MockMediaStore};

/// ApiDoc
///
/// Auto-generated OpenAPI document for the gateway, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::serve_media),
    components(
        schemas(
            models::ErrorResponse, models::HealthResponse,
            models::SubscriptionTier, models::Role,
        )
    ),
    tags(
        (name = "media-gateway", description = "Protected media access gateway")
    )
)]
struct ApiDoc;

/// AppState
///
/// Single, immutable container shared by every request. Holds no per-request or
/// per-credential data: every request is re-authenticated from scratch.
#[derive(Clone)]
pub struct AppState {
    /// Storage Layer: where media bytes are read from.
    pub store: MediaStoreState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for MediaStoreState {
    fn from_ref(app_state: &AppState) -> MediaStoreState {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the observability layers and registers
/// the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(media::media_routes())
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`. Records method, path and request id.
///
/// Only the URI path is recorded: the query string may carry a bearer credential
/// and must never reach the logs.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}
