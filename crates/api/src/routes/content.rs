use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use content_ops_core::review::{
    ApprovalAction, ContentItem, ContentQuery, ContentQueryParams, ContentRow, RejectRequest,
};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::session::CurrentSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/content", get(list_content))
        .route("/api/content/{id}/approve", post(approve))
        .route("/api/content/{id}/reject", post(reject))
}

async fn list_content(
    Extension(current): Extension<CurrentSession>,
    Query(params): Query<ContentQueryParams>,
) -> ApiResult<Json<Vec<ContentItem>>> {
    let query = ContentQuery::try_from(params)?;
    let mut session = current.handle.lock().await;
    let rows = session
        .gateway
        .fetch_all::<ContentRow>(&query.to_statement())
        .await
        .map_err(ApiError::gateway("Failed to load content"))?;
    Ok(Json(rows.into_iter().map(ContentItem::from).collect()))
}

async fn approve(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    send(&state, &id, ApprovalAction::Approve, None).await
}

async fn reject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<RejectRequest>>,
) -> ApiResult<Json<Value>> {
    let reason = body.and_then(|Json(body)| body.reason);
    send(&state, &id, ApprovalAction::Reject, reason.as_deref()).await
}

/// The webhook does the actual status change; nothing is written here.
async fn send(
    state: &AppState,
    id: &str,
    action: ApprovalAction,
    reason: Option<&str>,
) -> ApiResult<Json<Value>> {
    state
        .webhook()
        .send_approval_action(id, action, reason)
        .await
        .map_err(ApiError::gateway("Failed to send approval"))?;
    Ok(Json(json!({ "content_id": id, "action": action, "sent": true })))
}
