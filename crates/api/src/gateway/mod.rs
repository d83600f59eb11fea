//! Outbound I/O: the session's SQL connection, the approval webhook and the
//! posting-API client. Every failure surfaces as a [`GatewayError`] that the
//! caller turns into a generic message; nothing here panics.

pub mod analytics;
pub mod query;
pub mod webhook;

use std::time::Duration;

pub use analytics::UploadPostClient;
pub use query::{Expect, QueryGateway, QueryOutcome, TrackedConnection};
pub use webhook::ApprovalWebhook;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("database connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not bind parameter: {0}")]
    Bind(String),

    #[error("session is closed")]
    Closed,

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("unreadable response: {0}")]
    Decode(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
