use content_ops_core::platform::{HistoryRequest, PlatformAnalytics, UploadHistoryPage};
use content_ops_core::publishing::Platform;
use reqwest::Url;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::{GatewayError, GatewayResult};
use crate::config::AnalyticsSettings;

/// Client for the third-party posting API.
///
/// Public calls return `None` whenever data is unavailable (unconfigured,
/// unreachable, non-2xx or unreadable); the cause is logged here.
#[derive(Debug, Clone)]
pub struct UploadPostClient {
    client: reqwest::Client,
    settings: AnalyticsSettings,
}

impl UploadPostClient {
    pub fn new(client: reqwest::Client, settings: AnalyticsSettings) -> Self {
        Self { client, settings }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.api_key.is_some()
    }

    pub fn profile(&self) -> &str {
        &self.settings.profile
    }

    #[instrument(skip(self, platforms), fields(profile = %profile))]
    pub async fn fetch_platform_analytics(
        &self,
        profile: &str,
        platforms: &[Platform],
    ) -> Option<PlatformAnalytics> {
        let joined = platforms
            .iter()
            .map(Platform::as_str)
            .collect::<Vec<_>>()
            .join(",");
        info!("Fetching analytics for profile: {profile}");

        let body = self
            .get_json(&["api", "analytics", profile], &[("platforms", joined)])
            .await
            .map_err(|e| error!(error = %e, "Failed to fetch analytics"))
            .ok()?;

        match PlatformAnalytics::decode(body, platforms) {
            Ok(analytics) => {
                if analytics.success.is_failed() {
                    warn!(message = ?analytics.message, "Analytics API reported failure");
                }
                info!("Analytics fetched successfully");
                Some(analytics)
            }
            Err(e) => {
                error!(error = %e, "Unreadable analytics response");
                None
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch_upload_history(&self, request: HistoryRequest) -> Option<UploadHistoryPage> {
        let body = self
            .get_json(
                &["api", "uploadposts", "history"],
                &[
                    ("page", request.page.to_string()),
                    ("limit", request.limit.to_string()),
                ],
            )
            .await
            .map_err(|e| error!(error = %e, "Failed to fetch upload history"))
            .ok()?;

        match serde_json::from_value::<UploadHistoryPage>(body) {
            Ok(page) => Some(page.with_request(request)),
            Err(e) => {
                error!(error = %e, "Unreadable upload history response");
                None
            }
        }
    }

    async fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> GatewayResult<Value> {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            warn!("Upload-Post API key not configured");
            return Err(GatewayError::NotConfigured("Upload-Post API key"));
        };

        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|e| GatewayError::Decode(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Decode("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Apikey {api_key}"))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }
}
