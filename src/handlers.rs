use crate::{
    config::AppConfig,
    error::GatewayError,
    extract::MaybeCredential,
    models::{ErrorResponse, HealthResponse},
    policy::{Access, ResourceClass, authorize},
    storage::MediaStoreState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::{StatusCode, header},
    response::Response,
};
use chrono::Utc;

// --- Handlers ---

/// health
///
/// [Public Route] Liveness check for load balancers and monitoring.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// not_found
///
/// [Gateway Route] `/secure-media` and `/secure-media/` name no object. Answered with
/// the same 404 body as any other unresolvable path.
pub async fn not_found() -> GatewayError {
    GatewayError::NotFound("empty media path".to_string())
}

/// serve_media
///
/// [Gateway Route] Streams one media object out of private storage.
///
/// Pipeline: extract credential (query, header, cookie), decide access for the
/// path's resource class, resolve the path inside the storage root, then frame the bytes.
/// Authorization is fully settled before any byte of the file is read.
#[utoipa::path(
    get,
    path = "/secure-media/{path}",
    params(
        ("path" = String, Path, description = "Relative media path, e.g. videos/movie1.mp4"),
        ("token" = Option<String>, Query, description = "Bearer credential (highest priority carrier)")
    ),
    responses(
        (status = 200, description = "Media bytes with framing and caching headers"),
        (status = 401, description = "Credential absent, invalid or expired", body = ErrorResponse),
        (status = 403, description = "Subscription tier insufficient", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 500, description = "Internal failure", body = ErrorResponse)
    )
)]
pub async fn serve_media(
    State(config): State<AppConfig>,
    State(store): State<MediaStoreState>,
    path: Result<Path<String>, PathRejection>,
    MaybeCredential(credential): MaybeCredential,
) -> Result<Response, GatewayError> {
    // Undecodable paths (e.g. invalid UTF-8 escapes) cannot name a stored file.
    let Path(relative_path) = path.map_err(|rejection| {
        tracing::info!(reason = %rejection, "Media path rejected");
        GatewayError::NotFound(rejection.to_string())
    })?;
    let class = ResourceClass::from_path(&relative_path);
    let now = Utc::now().timestamp();

    let access = authorize(credential.as_ref(), class, &config.jwt_secret, now)
        .inspect_err(|e| {
            tracing::warn!(
                path = %relative_path,
                source = ?credential.as_ref().map(|c| c.source),
                reason = %e,
                "Media access denied"
            );
        })?;

    if let Access::Subscriber(claims) = &access {
        tracing::debug!(
            subject = %claims.sub,
            tier = ?claims.subscription_tier,
            path = %relative_path,
            "Subscriber access granted"
        );
    }

    let object = store.open(&relative_path).await.inspect_err(|e| match e {
        GatewayError::Internal(_) => {
            tracing::error!(path = %relative_path, error = %e, "Media read failed")
        }
        _ => tracing::info!(path = %relative_path, reason = %e, "Media not served"),
    })?;

    let content_length = object.len();
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, object.content_type)
        .header(header::CONTENT_LENGTH, content_length.to_string())
        .header(header::CACHE_CONTROL, class.cache_control())
        .header(header::CONTENT_DISPOSITION, "inline")
        .body(object.into_body())
        .map_err(|e| GatewayError::Internal(e.to_string()))?;

    tracing::info!(
        path = %relative_path,
        class = ?class,
        bytes = content_length,
        "Media served"
    );

    Ok(response)
}
