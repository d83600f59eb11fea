use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Session and integration summary. No database round trip: the service holds
/// no connection of its own outside operator sessions.
async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "active_sessions": state.sessions().active_sessions().await,
        "open_connections": state.sessions().open_connections(),
        "webhook_configured": state.webhook().is_configured(),
        "analytics_configured": state.analytics().is_configured(),
    }))
}

/// Lightweight ping.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
