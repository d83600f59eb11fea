pub mod cors;
pub mod request_tracing;
pub mod session;

use tower_http::limit::RequestBodyLimitLayer;

/// Largest request body accepted; every form on the dashboard is small.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn body_limit_layer() -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(MAX_BODY_BYTES)
}
