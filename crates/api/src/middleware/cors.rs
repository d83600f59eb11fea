use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer from the configured origin.
///
/// `*` allows any origin; anything else must be a single exact origin. A
/// value that is not a valid header leaves cross-origin requests disabled.
pub fn cors_layer(allowed_origin: &str) -> CorsLayer {
    if allowed_origin.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    match HeaderValue::from_str(allowed_origin.trim()) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            tracing::warn!(origin = %allowed_origin, error = %e, "Ignoring invalid CORS origin");
            CorsLayer::new()
        }
    }
}
