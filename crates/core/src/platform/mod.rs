//! Response model of the third-party posting API.

pub mod analytics;
pub mod history;

pub use analytics::{ApiOutcome, PlatformAnalytics, PlatformMetrics};
pub use history::{HistoryParams, HistoryRequest, UploadHistoryPage, UploadRecord};
