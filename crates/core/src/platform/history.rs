use serde::{Deserialize, Serialize};

use super::analytics::{lenient_count, ApiOutcome};
use crate::validate::ValidationError;

pub const DEFAULT_HISTORY_LIMIT: u32 = 20;
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// Query string of the upload-history screen.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    pub page: u32,
    pub limit: u32,
}

impl TryFrom<HistoryParams> for HistoryRequest {
    type Error = ValidationError;

    fn try_from(params: HistoryParams) -> Result<Self, Self::Error> {
        let page = params.page.unwrap_or(1);
        let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if page == 0 {
            return Err(ValidationError::OutOfRange("page", u32::MAX));
        }
        if limit == 0 || limit > MAX_HISTORY_LIMIT {
            return Err(ValidationError::OutOfRange("limit", MAX_HISTORY_LIMIT));
        }
        Ok(Self { page, limit })
    }
}

/// One past upload as the posting API reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub success: ApiOutcome,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "url")]
    pub post_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "upload_timestamp", alias = "created_at")]
    pub uploaded_at: Option<String>,
    #[serde(default, alias = "error_message")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "lenient_count")]
    pub page: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total: u64,
    #[serde(default, deserialize_with = "lenient_count", alias = "totalPages")]
    pub total_pages: u64,
}

/// A page of upload history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadHistoryPage {
    #[serde(default)]
    pub success: ApiOutcome,
    #[serde(default, alias = "uploads", alias = "data")]
    pub history: Vec<UploadRecord>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl UploadHistoryPage {
    /// Fill pagination the API left out from the request that produced it.
    pub fn with_request(mut self, request: HistoryRequest) -> Self {
        if self.pagination.page == 0 {
            self.pagination.page = u64::from(request.page);
        }
        if self.pagination.limit == 0 {
            self.pagination.limit = u64::from(request.limit);
        }
        self
    }

    pub fn has_more(&self) -> bool {
        if self.pagination.total_pages > 0 {
            self.pagination.page < self.pagination.total_pages
        } else {
            self.pagination.total > self.pagination.page.saturating_mul(self.pagination.limit)
        }
    }
}
