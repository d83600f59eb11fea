use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sql::Statement;
use crate::validate::{is_all, ValidationError};

const DRIVE_PREVIEW_BASE: &str = "https://drive.google.com/file/d";

/// Review queue selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentStatusFilter {
    #[default]
    PendingReview,
    Rejected,
    All,
}

impl ContentStatusFilter {
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        match value.map(str::trim) {
            None | Some("") | Some("pending_review") => Ok(Self::PendingReview),
            Some("rejected") => Ok(Self::Rejected),
            Some(v) if is_all(v) => Ok(Self::All),
            Some(v) => Err(ValidationError::UnknownValue {
                field: "status",
                value: v.to_string(),
            }),
        }
    }

    fn status(&self) -> Option<&'static str> {
        match self {
            Self::PendingReview => Some("pending_review"),
            Self::Rejected => Some("rejected"),
            Self::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

impl SortOrder {
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("newest") | Some("desc") => Ok(Self::NewestFirst),
            Some("oldest") | Some("asc") => Ok(Self::OldestFirst),
            Some(v) => Err(ValidationError::UnknownValue {
                field: "sort",
                value: v.to_string(),
            }),
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Self::NewestFirst => "DESC",
            Self::OldestFirst => "ASC",
        }
    }
}

/// Query string of the review screen.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentQueryParams {
    pub status: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentQuery {
    pub status: ContentStatusFilter,
    pub sort: SortOrder,
}

impl TryFrom<ContentQueryParams> for ContentQuery {
    type Error = ValidationError;

    fn try_from(params: ContentQueryParams) -> Result<Self, Self::Error> {
        Ok(Self {
            status: ContentStatusFilter::parse(params.status.as_deref())?,
            sort: SortOrder::parse(params.sort.as_deref())?,
        })
    }
}

impl ContentQuery {
    pub fn to_statement(&self) -> Statement {
        let mut stmt = Statement::new(
            "SELECT c.id::TEXT AS id, c.caption, c.hashtags, c.video_gdrive_link, \
             c.video_gdrive_file_id, c.status, c.created_at, \
             p.title AS product_title, p.price::FLOAT8 AS product_price \
             FROM content c JOIN products p ON c.product_id = p.id WHERE 1=1",
        );
        if let Some(status) = self.status.status() {
            let placeholder = stmt.push_param(status);
            stmt.sql.push_str(&format!(" AND c.status = {placeholder}"));
        }
        stmt.sql
            .push_str(&format!(" ORDER BY c.created_at {}", self.sort.keyword()));
        stmt
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContentRow {
    pub id: String,
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub video_gdrive_link: Option<String>,
    pub video_gdrive_file_id: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub product_title: String,
    pub product_price: Option<f64>,
}

/// One card on the review screen.
#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub product_title: String,
    pub product_price: Option<f64>,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub video_link: Option<String>,
    pub preview_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<ContentRow> for ContentItem {
    fn from(row: ContentRow) -> Self {
        let preview = row
            .video_gdrive_file_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(preview_url);
        Self {
            id: row.id,
            product_title: row.product_title,
            product_price: row.product_price,
            caption: row.caption.unwrap_or_default(),
            hashtags: row.hashtags.unwrap_or_default(),
            video_link: row.video_gdrive_link,
            preview_url: preview,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Embeddable preview for a stored video file.
pub fn preview_url(file_id: &str) -> String {
    format!("{DRIVE_PREVIEW_BASE}/{file_id}/preview")
}
