use crate::approval::gate::APPROVAL_FILE_PREFIX;
use crate::config::VaultPaths;
use crate::docstore;
use crate::pipeline::RunSummary;
use crate::shared::logging;
use crate::shared::time::{iso_ts, today_str};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

pub const HEADING_STATUS: &str = "## System Status";
pub const HEADING_ACTIVITY: &str = "## Recent Activity";
pub const HEADING_ALERTS: &str = "## Alerts";
pub const NO_ALERTS_LINE: &str = "- None";

/// Appends an activity line to the status surface, optionally mirrored into
/// the alerts section. A missing dashboard is a logged no-op; unrelated
/// sections are never touched.
pub fn record_activity(paths: &VaultPaths, message: &str, is_alert: bool, now: DateTime<Utc>) {
    let Ok(mut content) = fs::read_to_string(&paths.dashboard) else {
        logging::log(
            &paths.root,
            &format!("dashboard missing — dropped entry: {message}"),
        );
        return;
    };

    let entry = format!("- {} : {message}", iso_ts(now));
    content = insert_under_heading(&content, HEADING_ACTIVITY, &entry);
    if is_alert {
        content = add_alert_line(&content, &entry);
    }

    if let Err(err) = docstore::write_document(&paths.dashboard, &content) {
        logging::log(&paths.root, &format!("dashboard update failed: {err}"));
    }
}

pub fn record_alert(paths: &VaultPaths, message: &str, now: DateTime<Utc>) {
    record_activity(paths, message, true, now);
}

/// Rewrites the counters block and appends the pass activity line. A pass
/// with zero failures resets the alerts section to its explicit none state.
pub fn update_dashboard(paths: &VaultPaths, summary: &RunSummary, now: DateTime<Utc>) {
    let Ok(mut content) = fs::read_to_string(&paths.dashboard) else {
        logging::log(&paths.root, "dashboard missing — skipped status update");
        return;
    };

    let counters = format!(
        "- Pending Tasks: {}\n- Completed Today: {}\n- Pending Approvals: {}\n- Last Execution: {}",
        count_markdown_files(&paths.needs_action),
        count_completed_today(&paths.done, &today_str(now)),
        count_approval_files(&paths.pending_approval),
        iso_ts(now),
    );
    content = replace_dash_block(&content, HEADING_STATUS, &counters);

    let activity = format!(
        "- {} : Pipeline run complete — {} processed, {} pending approval, {} failed.",
        iso_ts(now),
        summary.processed,
        summary.pending_approval,
        summary.failed,
    );
    content = insert_under_heading(&content, HEADING_ACTIVITY, &activity);

    if summary.failed == 0 {
        content = replace_dash_block(&content, HEADING_ALERTS, NO_ALERTS_LINE);
    }

    if let Err(err) = docstore::write_document(&paths.dashboard, &content) {
        logging::log(&paths.root, &format!("dashboard update failed: {err}"));
    } else {
        logging::log(&paths.root, "dashboard updated");
    }
}

pub fn count_markdown_files(dir: &Path) -> usize {
    docstore::sorted_markdown_paths(dir)
        .map(|paths| paths.len())
        .unwrap_or(0)
}

pub fn count_approval_files(dir: &Path) -> usize {
    docstore::sorted_markdown_paths(dir)
        .map(|paths| {
            paths
                .iter()
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.starts_with(APPROVAL_FILE_PREFIX))
                        .unwrap_or(false)
                })
                .count()
        })
        .unwrap_or(0)
}

/// Archived documents carrying today's date anywhere in their text count as
/// completed today.
pub fn count_completed_today(done_dir: &Path, today: &str) -> usize {
    let Ok(paths) = docstore::sorted_markdown_paths(done_dir) else {
        return 0;
    };
    paths
        .iter()
        .filter(|path| {
            fs::read_to_string(path)
                .map(|content| content.contains(today))
                .unwrap_or(false)
        })
        .count()
}

/// Inserts `line` directly below `heading`. Content without the heading is
/// returned unchanged.
fn insert_under_heading(content: &str, heading: &str, line: &str) -> String {
    match find_heading(content, heading) {
        Some(after_heading) => {
            let (before, after) = content.split_at(after_heading);
            if before.ends_with('\n') {
                format!("{before}{line}\n{after}")
            } else {
                format!("{before}\n{line}\n{after}")
            }
        }
        None => content.to_string(),
    }
}

/// Replaces the run of `- ` lines directly under `heading` with `block`.
fn replace_dash_block(content: &str, heading: &str, block: &str) -> String {
    let Some(block_start) = find_heading(content, heading) else {
        return content.to_string();
    };

    let mut block_end = block_start;
    for line in content[block_start..].lines() {
        if !line.starts_with("- ") {
            break;
        }
        block_end += line.len() + 1;
    }
    let block_end = block_end.min(content.len());

    format!(
        "{}{}\n{}",
        &content[..block_start],
        block.trim_end(),
        &content[block_end..]
    )
}

/// Alerts accumulate; only the `- None` placeholder is ever replaced.
fn add_alert_line(content: &str, entry: &str) -> String {
    let Some(after_heading) = find_heading(content, HEADING_ALERTS) else {
        return content.to_string();
    };
    let placeholder = format!("{HEADING_ALERTS}\n{NO_ALERTS_LINE}\n");
    if content.contains(&placeholder) {
        return content.replacen(
            &placeholder,
            &format!("{HEADING_ALERTS}\n{entry}\n"),
            1,
        );
    }
    let (before, after) = content.split_at(after_heading);
    if before.ends_with('\n') {
        format!("{before}{entry}\n{after}")
    } else {
        format!("{before}\n{entry}\n{after}")
    }
}

/// Byte offset just past the heading line's newline.
fn find_heading(content: &str, heading: &str) -> Option<usize> {
    let mut offset = 0usize;
    for line in content.lines() {
        let line_len = line.len();
        if line.trim_end() == heading {
            let end = offset + line_len;
            return Some(if end < content.len() { end + 1 } else { end });
        }
        offset += line_len + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    const DASHBOARD: &str = "# Dashboard\n\n## System Status\n- Pending Tasks: 9\n- Completed Today: 0\n- Pending Approvals: 0\n- Last Execution: never\n\n## Recent Activity\n- old entry\n\n## Alerts\n- None\n\n## Notes\nkeep me intact\n";

    fn vault_with_dashboard() -> (tempfile::TempDir, VaultPaths) {
        let tmp = tempdir().expect("tempdir");
        let paths = VaultPaths::from_vault_root(tmp.path());
        paths.ensure_directories().expect("dirs");
        fs::write(&paths.dashboard, DASHBOARD).expect("dashboard");
        (tmp, paths)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn update_rewrites_counters_and_preserves_other_sections() {
        let (_tmp, paths) = vault_with_dashboard();
        fs::write(paths.needs_action.join("t.md"), "x").expect("task");

        let summary = RunSummary {
            processed: 2,
            pending_approval: 1,
            archived: 2,
            ..RunSummary::default()
        };
        update_dashboard(&paths, &summary, now());

        let content = fs::read_to_string(&paths.dashboard).expect("read");
        assert!(content.contains("- Pending Tasks: 1\n"));
        assert!(content.contains("- Last Execution: 2026-04-01T12:00:00Z\n"));
        assert!(content.contains("2 processed, 1 pending approval, 0 failed"));
        assert!(content.contains("- old entry\n"));
        assert!(content.contains("## Notes\nkeep me intact\n"));
    }

    #[test]
    fn zero_failure_pass_resets_alerts_to_none() {
        let (_tmp, paths) = vault_with_dashboard();
        record_alert(&paths, "TASK FAILED — earlier pass", now());
        let content = fs::read_to_string(&paths.dashboard).expect("read");
        assert!(content.contains("TASK FAILED"));
        assert!(!content.contains("## Alerts\n- None\n"));

        let summary = RunSummary::default();
        update_dashboard(&paths, &summary, now());
        let content = fs::read_to_string(&paths.dashboard).expect("read");
        assert!(content.contains("## Alerts\n- None\n"));
    }

    #[test]
    fn alerts_accumulate_without_overwriting() {
        let (_tmp, paths) = vault_with_dashboard();
        record_alert(&paths, "first alert", now());
        record_alert(&paths, "second alert", now());

        let content = fs::read_to_string(&paths.dashboard).expect("read");
        assert!(content.contains("first alert"));
        assert!(content.contains("second alert"));
        // Both land in activity and alerts.
        assert_eq!(content.matches("first alert").count(), 2);
    }

    #[test]
    fn missing_dashboard_is_a_noop() {
        let tmp = tempdir().expect("tempdir");
        let paths = VaultPaths::from_vault_root(tmp.path());
        paths.ensure_directories().expect("dirs");
        record_alert(&paths, "nobody is listening", now());
        assert!(!paths.dashboard.exists());
    }

    #[test]
    fn completed_today_counts_by_date_substring() {
        let (_tmp, paths) = vault_with_dashboard();
        fs::write(paths.done.join("a.md"), "Completed: 2026-04-01T09:00:00Z").expect("a");
        fs::write(paths.done.join("b.md"), "Completed: 2026-03-30T09:00:00Z").expect("b");
        assert_eq!(count_completed_today(&paths.done, "2026-04-01"), 1);
    }
}
