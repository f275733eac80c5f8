use crate::approval::types::{
    ActionType, ApprovalDecision, ApprovalFrontmatter, ApprovalStatus, NotApprovedReason,
    RiskLevel,
};
use crate::approval::ApprovalError;
use crate::config::VaultPaths;
use crate::dashboard;
use crate::docstore::{self, render_document, split_document, DocError};
use crate::shared::time::{file_ts, iso_ts, now_utc, parse_iso_ts};
use crate::task::Category;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

pub const APPROVAL_FILE_PREFIX: &str = "APPROVAL_";

/// True when the action or the task's domain is one a human must sign off on.
/// Every `ActionType` variant is sensitive, so a known action always gates;
/// email and finance tasks gate even without a concrete action.
pub fn requires_approval(action: Option<ActionType>, category: Category) -> bool {
    action.is_some() || matches!(category, Category::Email | Category::Finance)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    pub action_type: ActionType,
    pub description: String,
    pub target: String,
    pub risk_level: RiskLevel,
    pub source_task: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedApproval {
    pub file: String,
    pub path: PathBuf,
}

pub fn create_approval_request(
    paths: &VaultPaths,
    request: &ApprovalRequest,
) -> Result<CreatedApproval, ApprovalError> {
    create_approval_request_at(paths, request, now_utc())
}

/// Writes a new approval request document, `pending`, with its expiry fixed
/// once from the risk window. The document is visible to reviewers only after
/// the atomic rename. A dashboard entry is appended, flagged as an alert for
/// medium and high risk.
pub fn create_approval_request_at(
    paths: &VaultPaths,
    request: &ApprovalRequest,
    now: DateTime<Utc>,
) -> Result<CreatedApproval, ApprovalError> {
    if request.description.trim().is_empty() {
        return Err(ApprovalError::MissingField {
            field: "description",
        });
    }
    if request.target.trim().is_empty() {
        return Err(ApprovalError::MissingField { field: "target" });
    }

    ensure_approval_dir(paths)?;

    let created = iso_ts(now);
    let expires = iso_ts(now + request.risk_level.expiry_window());
    let path = docstore::unique_doc_path(
        &paths.pending_approval,
        &format!("{APPROVAL_FILE_PREFIX}{}", file_ts(now)),
    );

    let content = render_approval_document(request, &created, &expires);
    docstore::write_document(&path, &content)?;

    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    dashboard::record_activity(
        paths,
        &format!(
            "APPROVAL REQUIRED ({risk}) — {action} targeting {target}. Review within {hours}h. File: {file}",
            risk = request.risk_level.as_str(),
            action = request.action_type,
            target = request.target,
            hours = request.risk_level.review_window_hours(),
        ),
        request.risk_level >= RiskLevel::Medium,
        now,
    );

    Ok(CreatedApproval { file, path })
}

pub fn check_approval(paths: &VaultPaths, action: ActionType, target: &str) -> ApprovalDecision {
    check_approval_at(paths, action, target, now_utc())
}

/// Evaluates the current approval state for an (action, target) pair.
///
/// Approval documents are scanned in filename order and the first one whose
/// `action_type` matches and whose full text contains `target` verbatim
/// decides. Expiry is evaluated lazily against `now` and beats the stored
/// status. Documents with unreadable frontmatter or an unknown status are
/// skipped, which fails safe to "no matching approval".
pub fn check_approval_at(
    paths: &VaultPaths,
    action: ActionType,
    target: &str,
    now: DateTime<Utc>,
) -> ApprovalDecision {
    if ensure_approval_dir(paths).is_err() {
        return ApprovalDecision::NotApproved {
            reason: NotApprovedReason::Unreadable,
        };
    }
    let Ok(entries) = approval_paths(&paths.pending_approval) else {
        return ApprovalDecision::NotApproved {
            reason: NotApprovedReason::Unreadable,
        };
    };

    for path in entries {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let Some(frontmatter) = parse_approval(&content) else {
            continue;
        };
        if frontmatter.action_type != action.as_str() {
            continue;
        }
        if !target.is_empty() && !content.contains(target) {
            continue;
        }

        if is_expired(&frontmatter.expires, now) {
            return ApprovalDecision::NotApproved {
                reason: NotApprovedReason::Expired {
                    expires: frontmatter.expires.clone(),
                },
            };
        }

        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return match frontmatter.status() {
            Some(ApprovalStatus::Approved) => ApprovalDecision::Approved { file },
            Some(ApprovalStatus::Rejected) => ApprovalDecision::NotApproved {
                reason: NotApprovedReason::Rejected,
            },
            Some(ApprovalStatus::RevisionRequested) => ApprovalDecision::NotApproved {
                reason: NotApprovedReason::RevisionRequested,
            },
            Some(ApprovalStatus::Pending) => ApprovalDecision::NotApproved {
                reason: NotApprovedReason::Pending,
            },
            // Executed or unknown: this document no longer governs; keep
            // scanning.
            _ => continue,
        };
    }

    ApprovalDecision::NotApproved {
        reason: NotApprovedReason::NoMatch,
    }
}

/// Flips `status: approved` to `status: executed` after the guarded action
/// completed. Returns `Ok(false)` when there was nothing to do: the file is
/// absent or its status is not exactly `approved`. Double execution attempts
/// are therefore silently idempotent.
pub fn mark_approval_executed(paths: &VaultPaths, file: &str) -> Result<bool, ApprovalError> {
    let path = paths.pending_approval.join(file);
    if !path.is_file() {
        return Ok(false);
    }

    let content = docstore::read_document(&path)?;
    let Some((yaml, body)) = split_document(&content) else {
        return Err(ApprovalError::Doc(DocError::Frontmatter {
            path: path.display().to_string(),
        }));
    };
    let mut frontmatter =
        ApprovalFrontmatter::parse(yaml).map_err(|e| docstore::parse_err(&path, e))?;

    if frontmatter.status() != Some(ApprovalStatus::Approved) {
        return Ok(false);
    }

    frontmatter.status = ApprovalStatus::Executed.as_str().to_string();
    let yaml = frontmatter
        .to_yaml()
        .map_err(|source| DocError::Serialize {
            path: path.display().to_string(),
            source,
        })?;
    docstore::write_document(&path, &render_document(&yaml, body))?;
    Ok(true)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalSummary {
    pub file: String,
    pub action_type: String,
    pub risk_level: String,
    pub status: String,
    pub created: String,
    pub expires: String,
    pub expired: bool,
}

pub fn list_pending(paths: &VaultPaths) -> Result<Vec<ApprovalSummary>, ApprovalError> {
    list_pending_at(paths, now_utc())
}

/// Read-only enumeration of every approval document for status reporting.
pub fn list_pending_at(
    paths: &VaultPaths,
    now: DateTime<Utc>,
) -> Result<Vec<ApprovalSummary>, ApprovalError> {
    ensure_approval_dir(paths)?;
    let mut results = Vec::new();

    for path in approval_paths(&paths.pending_approval)? {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let Some(frontmatter) = parse_approval(&content) else {
            continue;
        };
        results.push(ApprovalSummary {
            file: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            expired: is_expired(&frontmatter.expires, now),
            action_type: frontmatter.action_type,
            // Reviewers edit these documents by hand; an unrecognized risk
            // value reads back as high.
            risk_level: RiskLevel::parse(&frontmatter.risk_level)
                .as_str()
                .to_string(),
            status: frontmatter.status,
            created: frontmatter.created,
            expires: frontmatter.expires,
        });
    }

    Ok(results)
}

fn ensure_approval_dir(paths: &VaultPaths) -> Result<(), ApprovalError> {
    fs::create_dir_all(&paths.pending_approval).map_err(|source| ApprovalError::CreateDir {
        path: paths.pending_approval.display().to_string(),
        source,
    })
}

fn approval_paths(dir: &Path) -> Result<Vec<PathBuf>, DocError> {
    let mut paths = docstore::sorted_markdown_paths(dir)?;
    paths.retain(|p| {
        p.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(APPROVAL_FILE_PREFIX))
            .unwrap_or(false)
    });
    Ok(paths)
}

fn parse_approval(content: &str) -> Option<ApprovalFrontmatter> {
    let (yaml, _) = split_document(content)?;
    ApprovalFrontmatter::parse(yaml).ok()
}

/// An unparsable expiry never expires; the stored status still applies.
fn is_expired(expires: &str, now: DateTime<Utc>) -> bool {
    parse_iso_ts(expires)
        .map(|deadline| deadline < now)
        .unwrap_or(false)
}

fn render_approval_document(request: &ApprovalRequest, created: &str, expires: &str) -> String {
    let action = request.action_type.as_str();
    let risk = request.risk_level.as_str();
    format!(
        "---\n\
        type: approval_request\n\
        action_type: {action}\n\
        risk_level: {risk}\n\
        status: pending\n\
        created: {created}\n\
        expires: {expires}\n\
        ---\n\
        \n\
        # Approval Request\n\
        \n\
        ## Action\n\
        **Type**: {action}\n\
        **Risk Level**: {risk}\n\
        \n\
        ## Description\n\
        {description}\n\
        \n\
        ## Target\n\
        {target}\n\
        \n\
        ## Context\n\
        - **Requested by**: vaultkeeper autonomous loop\n\
        - **Created**: {created}\n\
        - **Expires**: {expires}\n\
        - **Source task**: {source_task}\n\
        \n\
        ## Risk Assessment\n\
        {assessment}\n\
        \n\
        ## Decision\n\
        \n\
        > **To approve**: Change `status: pending` to `status: approved` in frontmatter.\n\
        > **To reject**: Change `status: pending` to `status: rejected` in frontmatter.\n\
        > **To request changes**: Add notes under `## Reviewer Notes` and set `status: revision_requested`.\n\
        \n\
        - [ ] Reviewed by human operator\n\
        - [ ] Decision recorded\n\
        \n\
        ## Reviewer Notes\n\
        \n",
        description = request.description,
        target = request.target,
        source_task = request.source_task,
        assessment = request.risk_level.assessment(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn vault() -> (tempfile::TempDir, VaultPaths) {
        let tmp = tempdir().expect("tempdir");
        let paths = VaultPaths::from_vault_root(tmp.path());
        paths.ensure_directories().expect("dirs");
        (tmp, paths)
    }

    fn sample_request(target: &str, risk: RiskLevel) -> ApprovalRequest {
        ApprovalRequest {
            action_type: ActionType::SendEmail,
            description: "Reply to the billing question".to_string(),
            target: target.to_string(),
            risk_level: risk,
            source_task: "NA-1".to_string(),
        }
    }

    #[test]
    fn requires_approval_covers_actions_and_gated_categories() {
        assert!(requires_approval(
            Some(ActionType::ExternalApiCall),
            Category::General
        ));
        assert!(requires_approval(None, Category::Email));
        assert!(requires_approval(None, Category::Finance));
        assert!(!requires_approval(None, Category::File));
        assert!(!requires_approval(None, Category::Marketing));
    }

    #[test]
    fn created_request_round_trips_with_fixed_expiry() {
        let (_tmp, paths) = vault();
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();

        let created = create_approval_request_at(&paths, &sample_request("task_1.md", RiskLevel::Medium), now)
            .expect("create");
        assert!(created.path.exists());

        let content = fs::read_to_string(&created.path).expect("read");
        let frontmatter = parse_approval(&content).expect("frontmatter");
        assert_eq!(frontmatter.created, "2026-04-01T12:00:00Z");
        assert_eq!(frontmatter.expires, "2026-04-03T12:00:00Z");
        assert_eq!(frontmatter.status, "pending");
        assert!(content.contains("task_1.md"));
    }

    #[test]
    fn empty_target_is_rejected() {
        let (_tmp, paths) = vault();
        let err = create_approval_request(&paths, &sample_request("", RiskLevel::Low))
            .expect_err("must fail");
        assert!(matches!(err, ApprovalError::MissingField { field: "target" }));
    }

    #[test]
    fn colliding_timestamps_get_suffixed_filenames() {
        let (_tmp, paths) = vault();
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
        let first = create_approval_request_at(&paths, &sample_request("a.md", RiskLevel::Low), now)
            .expect("first");
        let second = create_approval_request_at(&paths, &sample_request("b.md", RiskLevel::Low), now)
            .expect("second");
        assert_ne!(first.file, second.file);
        assert!(second.file.ends_with("_1.md"));
    }

    #[test]
    fn check_walks_status_and_expiry() {
        let (_tmp, paths) = vault();
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
        let created = create_approval_request_at(&paths, &sample_request("task_1.md", RiskLevel::High), now)
            .expect("create");

        // Pending straight after creation.
        let decision = check_approval_at(&paths, ActionType::SendEmail, "task_1.md", now);
        assert_eq!(
            decision,
            ApprovalDecision::NotApproved {
                reason: NotApprovedReason::Pending
            }
        );

        // Different target does not match.
        let decision = check_approval_at(&paths, ActionType::SendEmail, "other.md", now);
        assert_eq!(
            decision,
            ApprovalDecision::NotApproved {
                reason: NotApprovedReason::NoMatch
            }
        );

        // Expiry beats stored status, even approved.
        let content = fs::read_to_string(&created.path).expect("read");
        fs::write(
            &created.path,
            content.replace("status: pending", "status: approved"),
        )
        .expect("approve");
        let late = now + chrono::Duration::hours(25);
        let decision = check_approval_at(&paths, ActionType::SendEmail, "task_1.md", late);
        assert!(matches!(
            decision,
            ApprovalDecision::NotApproved {
                reason: NotApprovedReason::Expired { .. }
            }
        ));

        // Inside the window the approval holds.
        let decision = check_approval_at(&paths, ActionType::SendEmail, "task_1.md", now);
        assert_eq!(
            decision,
            ApprovalDecision::Approved {
                file: created.file.clone()
            }
        );
    }

    #[test]
    fn mark_executed_is_idempotent() {
        let (_tmp, paths) = vault();
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
        let created = create_approval_request_at(&paths, &sample_request("task_1.md", RiskLevel::Low), now)
            .expect("create");

        // Pending: nothing to do.
        assert!(!mark_approval_executed(&paths, &created.file).expect("mark pending"));

        let content = fs::read_to_string(&created.path).expect("read");
        fs::write(
            &created.path,
            content.replace("status: pending", "status: approved"),
        )
        .expect("approve");

        assert!(mark_approval_executed(&paths, &created.file).expect("mark approved"));
        let content = fs::read_to_string(&created.path).expect("read back");
        assert!(content.contains("status: executed"));

        // Second call: already executed, nothing to do.
        assert!(!mark_approval_executed(&paths, &created.file).expect("mark executed"));
        assert!(!mark_approval_executed(&paths, "absent.md").expect("mark absent"));
    }

    #[test]
    fn list_pending_flags_expired_entries() {
        let (_tmp, paths) = vault();
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
        create_approval_request_at(&paths, &sample_request("task_1.md", RiskLevel::High), now)
            .expect("create");

        let fresh = list_pending_at(&paths, now).expect("list");
        assert_eq!(fresh.len(), 1);
        assert!(!fresh[0].expired);
        assert_eq!(fresh[0].action_type, "send_email");
        assert_eq!(fresh[0].risk_level, "high");

        let late = now + chrono::Duration::hours(25);
        let stale = list_pending_at(&paths, late).expect("list late");
        assert!(stale[0].expired);
    }

    #[test]
    fn list_pending_reads_unrecognized_risk_as_high() {
        let (_tmp, paths) = vault();
        let now = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();
        let created = create_approval_request_at(&paths, &sample_request("task_1.md", RiskLevel::Low), now)
            .expect("create");

        let content = fs::read_to_string(&created.path).expect("read");
        fs::write(
            &created.path,
            content.replace("risk_level: low", "risk_level: critical"),
        )
        .expect("rewrite");

        let listed = list_pending_at(&paths, now).expect("list");
        assert_eq!(listed[0].risk_level, "high");
    }
}
