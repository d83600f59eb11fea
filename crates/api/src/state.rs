use std::sync::Arc;

use crate::config::AppConfig;
use crate::gateway::{ApprovalWebhook, UploadPostClient};
use crate::session::SessionGate;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    config: AppConfig,
    sessions: SessionGate,
    webhook: ApprovalWebhook,
    analytics: UploadPostClient,
}

impl AppState {
    /// `http` is shared by both outbound clients and carries their timeout.
    pub fn new(config: AppConfig, http: reqwest::Client) -> Self {
        let sessions = SessionGate::new(config.database.clone());
        let webhook = ApprovalWebhook::new(http.clone(), config.webhook_url.clone());
        let analytics = UploadPostClient::new(http, config.analytics.clone());
        Self {
            inner: Arc::new(InnerState {
                config,
                sessions,
                webhook,
                analytics,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn sessions(&self) -> &SessionGate {
        &self.inner.sessions
    }

    pub fn webhook(&self) -> &ApprovalWebhook {
        &self.inner.webhook
    }

    pub fn analytics(&self) -> &UploadPostClient {
        &self.inner.analytics
    }
}
