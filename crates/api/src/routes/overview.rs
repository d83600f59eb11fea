use axum::{routing::get, Extension, Json, Router};
use content_ops_core::publishing::RecentPost;
use content_ops_core::stats::{OverviewCounters, QuickStats};
use content_ops_core::Statement;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::session::CurrentSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/stats/quick", get(quick_stats))
        .route("/api/overview", get(overview))
}

async fn quick_stats(Extension(current): Extension<CurrentSession>) -> ApiResult<Json<QuickStats>> {
    let mut session = current.handle.lock().await;
    let stats = session
        .gateway
        .fetch_one_or_default::<QuickStats>(&Statement::new(QuickStats::SQL))
        .await
        .map_err(ApiError::gateway("Failed to load quick stats"))?;
    Ok(Json(stats))
}

async fn overview(Extension(current): Extension<CurrentSession>) -> ApiResult<Json<Value>> {
    let mut session = current.handle.lock().await;
    let counters = session
        .gateway
        .fetch_one_or_default::<OverviewCounters>(&Statement::new(OverviewCounters::SQL))
        .await
        .map_err(ApiError::gateway("Failed to load dashboard metrics"))?;
    let recent: Vec<RecentPost> = session
        .gateway
        .fetch_all::<RecentPost>(&RecentPost::statement())
        .await
        .map_err(ApiError::gateway("Failed to load recent posts"))?
        .into_iter()
        .map(RecentPost::abbreviated)
        .collect();

    Ok(Json(json!({
        "counters": counters,
        "recent_posts": recent,
    })))
}
