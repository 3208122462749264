//! Router configuration for the web API.

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{download_file, list_files, upload_file, AppState};

/// Create the main API router.
pub fn create_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    // The blob store enforces the upload ceiling mid-stream, so the
    // framework's own body limit must not cut uploads off first.
    let files_routes = Router::new()
        .route("/", post(upload_file).get(list_files))
        .route("/:uri", get(download_file))
        .layer(DefaultBodyLimit::disable());

    Router::new()
        .nest("/files", files_routes)
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(state)
}

/// Create a CORS layer from the configured origins.
///
/// No configured origins means same-origin only.
fn create_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_with_origins() {
        let _layer = create_cors_layer(&["http://localhost:5173".to_string()]);
        // Should not panic on valid origins
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        let _layer = create_cors_layer(&["\u{0}bad origin".to_string()]);
        // Invalid origins are dropped, not fatal
    }
}
