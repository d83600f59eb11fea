use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use content_ops_core::platform::{HistoryParams, HistoryRequest};
use content_ops_core::publishing::{
    AnalyticsRange, AnalyticsSummary, DailyViews, Platform, PlatformEngagement, TopPost,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::middleware::session::CurrentSession;
use crate::state::AppState;

const NOT_CONFIGURED: &str = "Upload-Post API key is not configured";

#[derive(Debug, Default, Deserialize)]
struct AnalyticsQuery {
    range: Option<String>,
    platforms: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PlatformQuery {
    platforms: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/analytics", get(dashboard))
        .route("/api/analytics/platform", get(platform_analytics))
        .route("/api/analytics/uploads", get(upload_history))
}

/// Stored post analytics for the chosen range and platforms.
async fn dashboard(
    Extension(current): Extension<CurrentSession>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<Value>> {
    let range = AnalyticsRange::parse(query.range.as_deref())?;
    let platforms = Platform::parse_list(query.platforms.as_deref())?;
    let since = range.since(Utc::now());

    let mut session = current.handle.lock().await;
    let gateway = &mut session.gateway;
    let summary = gateway
        .fetch_one_or_default::<AnalyticsSummary>(&AnalyticsSummary::statement(since, &platforms))
        .await
        .map_err(ApiError::gateway("Failed to load analytics summary"))?;
    let daily_views = gateway
        .fetch_all::<DailyViews>(&DailyViews::statement(since, &platforms))
        .await
        .map_err(ApiError::gateway("Failed to load views over time"))?;
    let engagement = gateway
        .fetch_all::<PlatformEngagement>(&PlatformEngagement::statement(since, &platforms))
        .await
        .map_err(ApiError::gateway("Failed to load engagement"))?;
    let top_posts = gateway
        .fetch_all::<TopPost>(&TopPost::statement(since, &platforms))
        .await
        .map_err(ApiError::gateway("Failed to load top posts"))?;

    Ok(Json(json!({
        "range_days": range.days(),
        "platforms": platforms,
        "summary": summary,
        "daily_views": daily_views,
        "engagement": engagement,
        "top_posts": top_posts,
    })))
}

/// Live numbers from the posting API. Unavailability is a normal answer,
/// not an error.
async fn platform_analytics(
    State(state): State<AppState>,
    Query(query): Query<PlatformQuery>,
) -> ApiResult<Json<Value>> {
    let platforms = Platform::parse_list(query.platforms.as_deref())?;
    let client = state.analytics();
    if !client.is_configured() {
        return Ok(unavailable(NOT_CONFIGURED));
    }

    let Some(analytics) = client.fetch_platform_analytics(client.profile(), &platforms).await else {
        return Ok(unavailable("Platform analytics are currently unavailable"));
    };

    Ok(Json(json!({
        "available": true,
        "profile": client.profile(),
        "success": analytics.success,
        "message": analytics.message,
        "totals": analytics.totals(),
        "platforms": analytics.platforms,
    })))
}

async fn upload_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Value>> {
    let request = HistoryRequest::try_from(params)?;
    let client = state.analytics();
    if !client.is_configured() {
        return Ok(unavailable(NOT_CONFIGURED));
    }

    let Some(page) = client.fetch_upload_history(request).await else {
        return Ok(unavailable("Upload history is currently unavailable"));
    };

    Ok(Json(json!({
        "available": true,
        "success": page.success,
        "history": page.history,
        "pagination": page.pagination,
        "has_more": page.has_more(),
    })))
}

fn unavailable(message: &str) -> Json<Value> {
    Json(json!({ "available": false, "message": message }))
}
