use content_ops_core::review::{ApprovalAction, ApprovalPayload};
use tracing::{error, info, instrument};

use super::{GatewayError, GatewayResult};

/// Client for the automation webhook that carries out approve/reject.
///
/// Requests are sent once; a failure is reported to the operator, who
/// re-triggers by hand.
#[derive(Debug, Clone)]
pub struct ApprovalWebhook {
    client: reqwest::Client,
    url: Option<String>,
}

impl ApprovalWebhook {
    /// `client` carries the request timeout.
    pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    #[instrument(skip(self, reason), fields(content_id = %content_id, action = %action))]
    pub async fn send_approval_action(
        &self,
        content_id: &str,
        action: ApprovalAction,
        reason: Option<&str>,
    ) -> GatewayResult<()> {
        let Some(url) = self.url.as_deref() else {
            error!("N8N_WEBHOOK_URL not configured");
            return Err(GatewayError::NotConfigured("Webhook URL"));
        };

        let payload = ApprovalPayload::new(content_id, action, reason);
        info!("Sending {action} request for content_id: {content_id}");

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Webhook request failed");
                GatewayError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Webhook returned an error status");
            return Err(GatewayError::Status {
                status: status.as_u16(),
            });
        }

        info!(status = %status, "Webhook request successful");
        Ok(())
    }
}
