//! Content review: the approval queue and the decisions sent upstream.

pub mod approval;
pub mod content;

pub use approval::{ApprovalAction, ApprovalPayload, RejectRequest};
pub use content::{
    preview_url, ContentItem, ContentQuery, ContentQueryParams, ContentRow, ContentStatusFilter,
    SortOrder,
};
