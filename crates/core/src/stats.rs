//! Row counters shown on the sidebar, the overview and the settings screen.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct QuickStats {
    pub total_products: i64,
    pub pending_review: i64,
    pub published_posts: i64,
}

impl QuickStats {
    pub const SQL: &'static str = "SELECT \
        (SELECT COUNT(*) FROM products) AS total_products, \
        (SELECT COUNT(*) FROM content WHERE status = 'pending_review') AS pending_review, \
        (SELECT COUNT(*) FROM posts WHERE status = 'published') AS published_posts";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct OverviewCounters {
    pub total_products: i64,
    pub pending_review: i64,
    pub published_posts: i64,
    pub total_views: i64,
}

impl OverviewCounters {
    pub const SQL: &'static str = "SELECT \
        (SELECT COUNT(*) FROM products) AS total_products, \
        (SELECT COUNT(*) FROM content WHERE status = 'pending_review') AS pending_review, \
        (SELECT COUNT(*) FROM posts WHERE status = 'published') AS published_posts, \
        (SELECT COALESCE(SUM(views), 0)::BIGINT FROM analytics) AS total_views";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct DatabaseStats {
    pub products: i64,
    pub content: i64,
    pub posts: i64,
    pub analytics: i64,
}

impl DatabaseStats {
    pub const SQL: &'static str = "SELECT \
        (SELECT COUNT(*) FROM products) AS products, \
        (SELECT COUNT(*) FROM content) AS content, \
        (SELECT COUNT(*) FROM posts) AS posts, \
        (SELECT COUNT(*) FROM analytics) AS analytics";
}

/// The newest active brand voice profile.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BrandVoice {
    pub tone_description: Option<String>,
    pub emoji_usage: Option<String>,
    pub sample_captions: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl BrandVoice {
    pub const SQL: &'static str = "SELECT tone_description, emoji_usage, sample_captions, created_at \
        FROM brand_voice WHERE is_active = true ORDER BY created_at DESC LIMIT 1";
}
