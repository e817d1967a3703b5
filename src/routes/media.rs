use crate::{AppState, handlers};
use axum::{
    Router,
    http::{HeaderValue, header},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;

/// Media Router Module
///
/// Mounts the gateway under `/secure-media`. The trailing wildcard captures the full
/// relative path (`images/...`, `videos/...`, or anything else, which fails closed).
/// The wildcard never matches an empty path, so the bare mount point is routed to the
/// gateway's own 404.
///
/// No auth route layer is applied here: images must stay reachable without a credential,
/// so the access decision lives in `handlers::serve_media` where the resource class is known.
/// The security headers are a layer so that every response from this router carries
/// them, including rejections axum produces before a handler runs.
pub fn media_routes() -> Router<AppState> {
    Router::new()
        // GET /secure-media/{*path}
        .route("/secure-media/{*path}", get(handlers::serve_media))
        // GET /secure-media and /secure-media/
        .route("/secure-media", get(handlers::not_found))
        .route("/secure-media/", get(handlers::not_found))
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                )),
        )
}
