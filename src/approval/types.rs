use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of sensitive actions. Every variant requires an approved,
/// unexpired approval request before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    SendEmail,
    PublishPost,
    LinkedinPost,
    FinancialTransaction,
    DeleteExternal,
    ExternalApiCall,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SendEmail => "send_email",
            Self::PublishPost => "publish_post",
            Self::LinkedinPost => "linkedin_post",
            Self::FinancialTransaction => "financial_transaction",
            Self::DeleteExternal => "delete_external",
            Self::ExternalApiCall => "external_api_call",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Unrecognized risk levels fail safe to the shortest window.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "low" => Self::Low,
            "medium" => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn review_window_hours(self) -> i64 {
        match self {
            Self::Low => 72,
            Self::Medium => 48,
            Self::High => 24,
        }
    }

    pub fn expiry_window(self) -> Duration {
        Duration::hours(self.review_window_hours())
    }

    pub fn assessment(self) -> &'static str {
        match self {
            Self::Low => "Routine action with minimal impact. Auto-expires in 72h.",
            Self::Medium => {
                "Action affects external systems or contacts. Requires review within 48h."
            }
            Self::High => {
                "Irreversible or high-impact action. Requires immediate review within 24h."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    RevisionRequested,
    Executed,
}

impl ApprovalStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "revision_requested" => Some(Self::RevisionRequested),
            "executed" => Some(Self::Executed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::RevisionRequested => "revision_requested",
            Self::Executed => "executed",
        }
    }
}

/// Approval request frontmatter. The human reviewer is the only writer of the
/// pending -> approved/rejected/revision_requested transitions, so the raw
/// strings are kept and typed lazily at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApprovalFrontmatter {
    #[serde(rename = "type", default = "approval_request_kind")]
    pub kind: String,
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub expires: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

fn approval_request_kind() -> String {
    "approval_request".to_string()
}

impl ApprovalFrontmatter {
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn status(&self) -> Option<ApprovalStatus> {
        ApprovalStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approved { file: String },
    NotApproved { reason: NotApprovedReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotApprovedReason {
    NoMatch,
    Pending,
    Rejected,
    RevisionRequested,
    Expired { expires: String },
    Unreadable,
}

impl std::fmt::Display for NotApprovedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMatch => write!(f, "no matching approval file found"),
            Self::Pending => write!(f, "approval is pending human review"),
            Self::Rejected => write!(f, "approval was rejected"),
            Self::RevisionRequested => write!(f, "revision requested by reviewer"),
            Self::Expired { expires } => write!(f, "approval expired at {expires}"),
            Self::Unreadable => write!(f, "cannot read Pending_Approval/"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_windows_match_policy() {
        assert_eq!(RiskLevel::Low.review_window_hours(), 72);
        assert_eq!(RiskLevel::Medium.review_window_hours(), 48);
        assert_eq!(RiskLevel::High.review_window_hours(), 24);
    }

    #[test]
    fn unrecognized_risk_fails_safe_to_high() {
        assert_eq!(RiskLevel::parse("critical"), RiskLevel::High);
        assert_eq!(RiskLevel::parse(""), RiskLevel::High);
        assert_eq!(RiskLevel::parse("low"), RiskLevel::Low);
    }

    #[test]
    fn approval_status_round_trips() {
        for status in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
            ApprovalStatus::RevisionRequested,
            ApprovalStatus::Executed,
        ] {
            assert_eq!(ApprovalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApprovalStatus::parse("maybe"), None);
    }
}
