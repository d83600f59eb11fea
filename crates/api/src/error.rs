use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use content_ops_core::ValidationError;
use serde_json::json;

use crate::gateway::GatewayError;

/// Shown for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// API error type, rendered as `{"error": {type, message, statusCode}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{context}: {source}")]
    Gateway {
        context: &'static str,
        #[source]
        source: GatewayError,
    },
}

impl ApiError {
    /// Attach the user-facing operation name to a gateway failure.
    pub fn gateway(context: &'static str) -> impl FnOnce(GatewayError) -> ApiError {
        move |source| ApiError::Gateway { context, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, "validation", err.to_string()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalidCredentials",
                INVALID_CREDENTIALS.to_string(),
            ),
            ApiError::Gateway { context, source } => match source {
                GatewayError::Closed => (
                    StatusCode::UNAUTHORIZED,
                    "unauthorized",
                    "Authentication required".to_string(),
                ),
                GatewayError::NotConfigured(_) => {
                    tracing::warn!("{context}: {source}");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "notConfigured",
                        format!("{context}: {source}"),
                    )
                }
                GatewayError::Http(_) | GatewayError::Status { .. } | GatewayError::Decode(_) => {
                    tracing::error!("{context}: {source}");
                    (StatusCode::BAD_GATEWAY, "upstreamError", context.to_string())
                }
                _ => {
                    tracing::error!("{context}: {source}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internalError", context.to_string())
                }
            },
        };

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
