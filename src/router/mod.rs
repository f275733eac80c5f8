pub mod reasoner;

pub use reasoner::{fallback_result, CommandReasoner, FallbackReasoner, Reasoner};

use crate::approval::{
    check_approval_at, create_approval_request_at, mark_approval_executed, ActionType,
    ApprovalDecision, ApprovalRequest, NotApprovedReason, RiskLevel,
};
use crate::config::{Settings, VaultPaths};
use crate::docstore::{
    self, check_all_items, insert_before_heading, render_document, split_document,
};
use crate::plan::{complete_plan, CreatedPlan};
use crate::shared::logging;
use crate::shared::time::iso_ts;
use crate::task::{
    Category, LoadedTask, TaskFrontmatter, TaskStatus, SECTION_CHECKLIST, SECTION_RESULT,
};
use chrono::{DateTime, Utc};

/// Terminal state of one task for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed { details: String },
    PendingApproval { action: ActionType },
    Failed { details: String },
    DryRun,
}

impl TaskOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::PendingApproval { .. } => "pending_approval",
            Self::Failed { .. } => "failed",
            Self::DryRun => "dry_run",
        }
    }
}

/// Canonical sensitive action for each gated category.
pub fn gated_action(category: Category) -> Option<ActionType> {
    match category {
        Category::Email => Some(ActionType::SendEmail),
        Category::Finance => Some(ActionType::FinancialTransaction),
        Category::Marketing => Some(ActionType::LinkedinPost),
        _ => None,
    }
}

/// Drives one task through the approval gate and execution.
///
/// Gated categories resolve their approval state first: a missing request is
/// created (once) and the task parks as pending approval for a later pass; a
/// rejected or expired approval is terminal. Approved or ungated tasks are
/// reasoned over and rewritten to completed in a single atomic document write.
pub fn route_task(
    paths: &VaultPaths,
    settings: &Settings,
    task: &LoadedTask,
    plan: Option<&CreatedPlan>,
    reasoner: &dyn Reasoner,
    dry_run: bool,
    now: DateTime<Utc>,
) -> TaskOutcome {
    if dry_run {
        logging::log(
            &paths.root,
            &format!("[dry-run] would process {} ({})", task.id, task.category),
        );
        return TaskOutcome::DryRun;
    }

    let mut governing_approval: Option<String> = None;
    if let Some(action) = gated_action(task.category) {
        match check_approval_at(paths, action, &task.filename, now) {
            ApprovalDecision::Approved { file } => {
                governing_approval = Some(file);
            }
            ApprovalDecision::NotApproved {
                reason: NotApprovedReason::NoMatch,
            } => {
                let request = approval_request_for(task, action);
                match create_approval_request_at(paths, &request, now) {
                    Ok(created) => {
                        logging::log(
                            &paths.root,
                            &format!(
                                "{}: approval requested for {action} ({})",
                                task.id, created.file
                            ),
                        );
                    }
                    Err(err) => {
                        return TaskOutcome::Failed {
                            details: format!("cannot create approval request: {err}"),
                        };
                    }
                }
                return TaskOutcome::PendingApproval { action };
            }
            ApprovalDecision::NotApproved {
                reason: reason @ (NotApprovedReason::Pending | NotApprovedReason::RevisionRequested),
            } => {
                logging::log(&paths.root, &format!("{}: {reason}", task.id));
                return TaskOutcome::PendingApproval { action };
            }
            ApprovalDecision::NotApproved {
                reason: reason @ NotApprovedReason::Rejected,
            } => {
                return TaskOutcome::Failed {
                    details: format!("approval rejected: {reason}"),
                };
            }
            ApprovalDecision::NotApproved {
                reason: reason @ NotApprovedReason::Expired { .. },
            } => {
                return TaskOutcome::Failed {
                    details: format!("approval expired: {reason}"),
                };
            }
            ApprovalDecision::NotApproved {
                reason: reason @ NotApprovedReason::Unreadable,
            } => {
                return TaskOutcome::Failed {
                    details: reason.to_string(),
                };
            }
        }
    }

    logging::log(
        &paths.root,
        &format!("executing {} ({})...", task.id, task.category),
    );
    let description = task.description();
    let required_outcome = task.required_outcome();
    let result_text = reasoner
        .reason(&description, &required_outcome)
        .unwrap_or_else(|| {
            logging::log(
                &paths.root,
                "reasoner unavailable — producing structured analysis",
            );
            fallback_result(&description, &required_outcome)
        });

    if let Err(details) = write_completed_task(paths, settings, task, plan, &result_text, now) {
        return TaskOutcome::Failed { details };
    }

    if let Some(file) = governing_approval {
        match mark_approval_executed(paths, &file) {
            Ok(true) => {}
            Ok(false) => logging::log(
                &paths.root,
                &format!("{}: approval {file} was no longer approved", task.id),
            ),
            Err(err) => logging::log(
                &paths.root,
                &format!("{}: could not mark approval executed: {err}", task.id),
            ),
        }
    }

    if let Some(plan) = plan {
        if let Err(err) = complete_plan(paths, &plan.file) {
            logging::log(
                &paths.root,
                &format!("{}: could not complete plan {}: {err}", task.id, plan.file),
            );
        }
    }

    TaskOutcome::Completed {
        details: format!("result written ({} chars)", result_text.chars().count()),
    }
}

fn approval_request_for(task: &LoadedTask, action: ActionType) -> ApprovalRequest {
    let description: String = task.description().chars().take(200).collect();
    let target = task
        .frontmatter
        .extra_str("email_from")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(&task.filename)
        .to_string();
    let risk_level = if task.category == Category::Finance {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    // The source task is recorded by filename: filenames are task identity,
    // and later passes re-check approval against the filename, which must
    // appear verbatim in the document even when the target is a recipient
    // address.
    ApprovalRequest {
        action_type: action,
        description: format!("Process {} task: {description}", task.category),
        target,
        risk_level,
        source_task: task.filename.clone(),
    }
}

/// Result insertion, checklist completion, completion notes, and the
/// pending -> completed status flip, persisted as one atomic rewrite.
fn write_completed_task(
    paths: &VaultPaths,
    settings: &Settings,
    task: &LoadedTask,
    plan: Option<&CreatedPlan>,
    result_text: &str,
    now: DateTime<Utc>,
) -> Result<(), String> {
    let raw = docstore::read_document(&task.path)
        .map_err(|err| format!("cannot read task file: {err}"))?;
    let (yaml, body) = split_document(&raw)
        .ok_or_else(|| format!("task file {} lost its frontmatter", task.filename))?;
    let mut frontmatter =
        TaskFrontmatter::parse(yaml).map_err(|err| format!("cannot parse task file: {err}"))?;

    let result_block = format!("## {SECTION_RESULT}\n{result_text}");
    let body = insert_before_heading(body, SECTION_CHECKLIST, &result_block);
    let body = check_all_items(&body);
    let body = format!(
        "{}\n\n## {}\n- Processed by {}\n- Task type: {}\n- Plan: {}\n- Completed: {}\n",
        body.trim_end(),
        crate::task::SECTION_COMPLETION_NOTES,
        settings.processor_name,
        task.category,
        plan.map(|p| p.file.as_str()).unwrap_or("inline"),
        iso_ts(now),
    );

    frontmatter.status = TaskStatus::Completed.as_str().to_string();
    let yaml = frontmatter
        .to_yaml()
        .map_err(|err| format!("cannot serialize task frontmatter: {err}"))?;
    docstore::write_document(&task.path, &render_document(&yaml, &body))
        .map_err(|err| format!("cannot write task file: {err}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gated_actions_cover_exactly_three_categories() {
        assert_eq!(gated_action(Category::Email), Some(ActionType::SendEmail));
        assert_eq!(
            gated_action(Category::Finance),
            Some(ActionType::FinancialTransaction)
        );
        assert_eq!(
            gated_action(Category::Marketing),
            Some(ActionType::LinkedinPost)
        );
        assert_eq!(gated_action(Category::File), None);
        assert_eq!(gated_action(Category::Message), None);
        assert_eq!(gated_action(Category::General), None);
    }
}
