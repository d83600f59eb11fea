use axum::{extract::Query, routing::get, Extension, Json, Router};
use chrono::Utc;
use content_ops_core::publishing::{CalendarEntry, CalendarParams, CalendarWindow};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::session::CurrentSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/calendar", get(calendar))
}

async fn calendar(
    Extension(current): Extension<CurrentSession>,
    Query(params): Query<CalendarParams>,
) -> ApiResult<Json<Value>> {
    let window = CalendarWindow::resolve(&params, Utc::now().date_naive())?;
    let mut session = current.handle.lock().await;
    let entries: Vec<CalendarEntry> = session
        .gateway
        .fetch_all::<CalendarEntry>(&CalendarEntry::statement(&window))
        .await
        .map_err(ApiError::gateway("Failed to load calendar"))?
        .into_iter()
        .map(CalendarEntry::abbreviated)
        .collect();

    Ok(Json(json!({
        "from": window.from,
        "to": window.to,
        "entries": entries,
    })))
}
