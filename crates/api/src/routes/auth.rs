use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use content_ops_core::Statement;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::gateway::Expect;
use crate::middleware::session::CurrentSession;
use crate::session::{LoginGrant, SessionToken};
use crate::state::AppState;

#[derive(Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Login and logout; reachable without a session.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// Routes describing the caller's own session.
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/api/session", get(current_session))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginGrant>> {
    let grant = state.sessions().login(&body.username, &body.password).await?;
    Ok(Json(grant))
}

/// Always succeeds; an absent or unknown token has nothing to close.
async fn logout(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
) -> StatusCode {
    let token = bearer.ok().and_then(|TypedHeader(Authorization(b))| b.token().parse::<SessionToken>().ok());
    if let Some(token) = token {
        state.sessions().logout(&token).await;
    }
    StatusCode::NO_CONTENT
}

async fn current_session(Extension(current): Extension<CurrentSession>) -> ApiResult<Json<Value>> {
    let mut session = current.handle.lock().await;
    let reachable = session
        .gateway
        .execute_query(&Statement::new("SELECT 1"), Expect::Rows)
        .await
        .is_ok();

    Ok(Json(json!({
        "username": session.username,
        "logged_in_at": session.logged_in_at,
        "database": if reachable { "connected" } else { "unavailable" },
    })))
}
