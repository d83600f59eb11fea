use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::publishing::Platform;

/// Outcome flag reported by the posting API.
///
/// The API sometimes omits `success`, sometimes sends `false`; the two are
/// kept apart rather than collapsed into a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiOutcome {
    Ok,
    Failed,
    #[default]
    Unknown,
}

impl ApiOutcome {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => ApiOutcome::Ok,
            Some(false) => ApiOutcome::Failed,
            None => ApiOutcome::Unknown,
        }
    }

    /// Only an explicit `false` counts as failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, ApiOutcome::Failed)
    }
}

impl<'de> Deserialize<'de> for ApiOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flag = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        };
        Ok(ApiOutcome::from_flag(flag))
    }
}

/// Accept integers, floats, numeric strings and null; anything else is zero.
pub(crate) fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.round() as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .ok()
            .or_else(|| s.trim().parse::<f64>().ok().filter(|f| *f > 0.0).map(|f| f.round() as u64))
            .unwrap_or(0),
        _ => 0,
    })
}

/// Counters for one platform. Every field the API leaves out reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformMetrics {
    #[serde(default)]
    pub success: ApiOutcome,
    #[serde(default, deserialize_with = "lenient_count", alias = "followers_count", alias = "follower_count")]
    pub followers: u64,
    #[serde(default, deserialize_with = "lenient_count", alias = "video_views", alias = "profile_views")]
    pub views: u64,
    #[serde(default, deserialize_with = "lenient_count", alias = "impressions_count")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reach: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub shares: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the response carried a section for this platform at all.
    #[serde(skip_deserializing)]
    pub reported: bool,
}

/// Decoded analytics response for one profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformAnalytics {
    pub success: ApiOutcome,
    pub message: Option<String>,
    pub platforms: BTreeMap<Platform, PlatformMetrics>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    success: ApiOutcome,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Map<String, Value>>,
    #[serde(flatten)]
    rest: serde_json::Map<String, Value>,
}

impl PlatformAnalytics {
    /// Decode a response body, keeping an entry for every requested platform.
    ///
    /// Platform sections are looked up at the top level first, then under
    /// `data`. A section that fails to decode is treated as absent.
    pub fn decode(body: Value, requested: &[Platform]) -> Result<Self, serde_json::Error> {
        let envelope: Envelope = serde_json::from_value(body)?;

        let platforms = requested
            .iter()
            .map(|platform| {
                let section = envelope
                    .rest
                    .get(platform.as_str())
                    .or_else(|| envelope.data.as_ref().and_then(|d| d.get(platform.as_str())))
                    .filter(|v| v.is_object());
                let metrics = match section {
                    Some(v) => match serde_json::from_value::<PlatformMetrics>(v.clone()) {
                        Ok(m) => PlatformMetrics { reported: true, ..m },
                        Err(err) => {
                            tracing::warn!(platform = %platform, error = %err, "Unreadable platform analytics section");
                            PlatformMetrics::default()
                        }
                    },
                    None => PlatformMetrics::default(),
                };
                (*platform, metrics)
            })
            .collect();

        Ok(Self {
            success: envelope.success,
            message: envelope.message,
            platforms,
        })
    }

    /// Sum of every counter across the decoded platforms.
    pub fn totals(&self) -> PlatformMetrics {
        self.platforms
            .values()
            .fold(PlatformMetrics::default(), |mut acc, m| {
                acc.followers = acc.followers.saturating_add(m.followers);
                acc.views = acc.views.saturating_add(m.views);
                acc.impressions = acc.impressions.saturating_add(m.impressions);
                acc.reach = acc.reach.saturating_add(m.reach);
                acc.likes = acc.likes.saturating_add(m.likes);
                acc.comments = acc.comments.saturating_add(m.comments);
                acc.shares = acc.shares.saturating_add(m.shares);
                acc.reported |= m.reported;
                acc
            })
    }
}
