pub mod gate;
pub mod types;

pub use gate::{
    check_approval, check_approval_at, create_approval_request, create_approval_request_at,
    list_pending, list_pending_at, mark_approval_executed, requires_approval, ApprovalRequest,
    ApprovalSummary, CreatedApproval,
};
pub use types::{
    ActionType, ApprovalDecision, ApprovalFrontmatter, ApprovalStatus, NotApprovedReason,
    RiskLevel,
};

use crate::docstore::DocError;

#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("approval request is missing {field}")]
    MissingField { field: &'static str },
    #[error("failed to create approval directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Doc(#[from] DocError),
}
