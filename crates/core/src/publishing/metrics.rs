//! Engagement aggregates over the `analytics` table, scoped by publish
//! date and platform. Every statement binds `$1` = since, `$2` = platforms.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::range::Platform;
use crate::sql::Statement;

const TOP_POSTS_LIMIT: i64 = 5;

fn scoped(sql: String, since: DateTime<Utc>, platforms: &[Platform]) -> Statement {
    Statement::new(sql)
        .bind(since)
        .bind(Platform::names(platforms))
}

const SCOPE: &str = "WHERE p.published_at >= $1 AND p.platform = ANY($2)";

#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct AnalyticsSummary {
    pub total_views: i64,
    pub total_engagement: i64,
    pub avg_engagement_rate: f64,
    pub total_posts: i64,
}

impl AnalyticsSummary {
    pub fn statement(since: DateTime<Utc>, platforms: &[Platform]) -> Statement {
        scoped(
            format!(
                "SELECT COALESCE(SUM(a.views), 0)::BIGINT AS total_views, \
                 COALESCE(SUM(a.likes + a.comments + a.shares), 0)::BIGINT AS total_engagement, \
                 COALESCE(AVG(a.engagement_rate), 0)::FLOAT8 AS avg_engagement_rate, \
                 COUNT(DISTINCT p.id)::BIGINT AS total_posts \
                 FROM analytics a JOIN posts p ON a.post_id = p.id {SCOPE}"
            ),
            since,
            platforms,
        )
    }
}

/// One point of the views-over-time series.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailyViews {
    pub date: NaiveDate,
    pub platform: String,
    pub total_views: i64,
}

impl DailyViews {
    pub fn statement(since: DateTime<Utc>, platforms: &[Platform]) -> Statement {
        scoped(
            format!(
                "SELECT DATE(p.published_at) AS date, p.platform, \
                 COALESCE(SUM(a.views), 0)::BIGINT AS total_views \
                 FROM analytics a JOIN posts p ON a.post_id = p.id {SCOPE} \
                 GROUP BY DATE(p.published_at), p.platform \
                 ORDER BY date"
            ),
            since,
            platforms,
        )
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlatformEngagement {
    pub platform: String,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

impl PlatformEngagement {
    pub fn statement(since: DateTime<Utc>, platforms: &[Platform]) -> Statement {
        scoped(
            format!(
                "SELECT p.platform, \
                 COALESCE(SUM(a.likes), 0)::BIGINT AS likes, \
                 COALESCE(SUM(a.comments), 0)::BIGINT AS comments, \
                 COALESCE(SUM(a.shares), 0)::BIGINT AS shares \
                 FROM analytics a JOIN posts p ON a.post_id = p.id {SCOPE} \
                 GROUP BY p.platform"
            ),
            since,
            platforms,
        )
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopPost {
    pub title: String,
    pub platform: String,
    pub views: i64,
    pub engagement_rate: f64,
    pub post_url: Option<String>,
}

impl TopPost {
    pub fn statement(since: DateTime<Utc>, platforms: &[Platform]) -> Statement {
        scoped(
            format!(
                "SELECT pr.title, p.platform, \
                 COALESCE(a.views, 0)::BIGINT AS views, \
                 COALESCE(a.engagement_rate, 0)::FLOAT8 AS engagement_rate, \
                 p.post_url \
                 FROM analytics a \
                 JOIN posts p ON a.post_id = p.id \
                 JOIN content c ON p.content_id = c.id \
                 JOIN products pr ON c.product_id = pr.id \
                 {SCOPE} \
                 ORDER BY a.views DESC NULLS LAST \
                 LIMIT {TOP_POSTS_LIMIT}"
            ),
            since,
            platforms,
        )
    }
}
