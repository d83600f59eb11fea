use axum::{extract::State, routing::get, Extension, Json, Router};
use content_ops_core::stats::{BrandVoice, DatabaseStats};
use content_ops_core::Statement;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::session::CurrentSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/settings", get(settings))
}

/// Secrets are never echoed; only whether they are set.
async fn settings(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> ApiResult<Json<Value>> {
    let mut session = current.handle.lock().await;
    let brand_voice = session
        .gateway
        .fetch_optional::<BrandVoice>(&Statement::new(BrandVoice::SQL))
        .await
        .map_err(ApiError::gateway("Failed to load brand voice"))?;
    let stats = session
        .gateway
        .fetch_one_or_default::<DatabaseStats>(&Statement::new(DatabaseStats::SQL))
        .await
        .map_err(ApiError::gateway("Failed to load database stats"))?;

    let config = state.config();
    Ok(Json(json!({
        "brand_voice": brand_voice,
        "webhook_url": state.webhook().url(),
        "analytics": {
            "profile": state.analytics().profile(),
            "api_key_configured": state.analytics().is_configured(),
        },
        "database": {
            "target": config.database.describe(),
            "stats": stats,
        },
    })))
}
