use std::fmt;

use serde::{Deserialize, Serialize};

/// Operator decision forwarded to the automation webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl ApprovalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalAction::Approve => "approve",
            ApprovalAction::Reject => "reject",
        }
    }
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body posted to the webhook: `{content_id, action, reason?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalPayload {
    pub content_id: String,
    pub action: ApprovalAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ApprovalPayload {
    /// Build a payload; a blank reason is dropped.
    pub fn new(content_id: impl Into<String>, action: ApprovalAction, reason: Option<&str>) -> Self {
        Self {
            content_id: content_id.into(),
            action,
            reason: reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        }
    }
}

/// Body of the reject confirmation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}
