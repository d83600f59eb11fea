use chrono::{DateTime, Utc};
use serde::Serialize;

use super::range::CalendarWindow;
use crate::sql::Statement;

/// Caption length shown in the overview feed.
pub const OVERVIEW_CAPTION_CHARS: usize = 100;
/// Caption length shown on calendar entries.
pub const CALENDAR_CAPTION_CHARS: usize = 200;
const RECENT_POSTS_LIMIT: i64 = 5;

/// Cut `caption` to `max` characters, marking the cut with `...`.
pub fn truncate_caption(caption: &str, max: usize) -> String {
    match caption.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &caption[..idx]),
        None => caption.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecentPost {
    pub post_url: Option<String>,
    pub platform: String,
    pub published_at: Option<DateTime<Utc>>,
    pub caption: String,
    pub product_title: String,
}

impl RecentPost {
    pub fn statement() -> Statement {
        Statement::new(format!(
            "SELECT p.post_url, p.platform, p.published_at, COALESCE(c.caption, '') AS caption, \
             pr.title AS product_title \
             FROM posts p \
             JOIN content c ON p.content_id = c.id \
             JOIN products pr ON c.product_id = pr.id \
             WHERE p.status = 'published' \
             ORDER BY p.published_at DESC \
             LIMIT {RECENT_POSTS_LIMIT}"
        ))
    }

    pub fn abbreviated(mut self) -> Self {
        self.caption = truncate_caption(&self.caption, OVERVIEW_CAPTION_CHARS);
        self
    }
}

/// A post with its engagement, as one calendar entry renders it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CalendarEntry {
    pub id: String,
    pub post_url: Option<String>,
    pub platform: String,
    pub published_at: DateTime<Utc>,
    pub caption: String,
    pub product_title: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub engagement_rate: f64,
}

impl CalendarEntry {
    pub fn statement(window: &CalendarWindow) -> Statement {
        Statement::new(
            "SELECT p.id::TEXT AS id, p.post_url, p.platform, p.published_at, \
             COALESCE(c.caption, '') AS caption, pr.title AS product_title, \
             COALESCE(a.views, 0)::BIGINT AS views, \
             COALESCE(a.likes, 0)::BIGINT AS likes, \
             COALESCE(a.comments, 0)::BIGINT AS comments, \
             COALESCE(a.engagement_rate, 0)::FLOAT8 AS engagement_rate \
             FROM posts p \
             JOIN content c ON p.content_id = c.id \
             JOIN products pr ON c.product_id = pr.id \
             LEFT JOIN analytics a ON p.id = a.post_id \
             WHERE p.published_at >= $1 AND p.published_at < $2 \
             ORDER BY p.published_at DESC",
        )
        .bind(window.start())
        .bind(window.end())
    }

    pub fn abbreviated(mut self) -> Self {
        self.caption = truncate_caption(&self.caption, CALENDAR_CAPTION_CHARS);
        self
    }
}
