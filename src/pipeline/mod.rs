use crate::config::{ConfigError, Settings, VaultPaths};
use crate::dashboard;
use crate::plan::{generate_plan_at, CreatedPlan};
use crate::router::{route_task, Reasoner, TaskOutcome};
use crate::shared::fs_atomic::relocate_unique;
use crate::shared::logging;
use crate::shared::time::now_utc;
use crate::task::{self, LoadedTask, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregate counts for one pass, folded into the status surface and the run
/// log; never persisted independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub processed: u32,
    pub pending_approval: u32,
    pub failed: u32,
    pub archived: u32,
    /// Always `complete` on a returned summary; a halted pass surfaces as a
    /// `PipelineError` instead of a summary.
    pub status: &'static str,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            processed: 0,
            pending_approval: 0,
            failed: 0,
            archived: 0,
            status: "complete",
        }
    }
}

impl RunSummary {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("mandatory policy document missing: {path}")]
    MissingHandbook { path: String },
    #[error("status surface document missing: {path}")]
    MissingDashboard { path: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One full sweep of the inbox: initialize, analyze, plan, route and execute,
/// archive, update the status surface, and report. The sole entry point of
/// the core; re-invocation is how parked approvals get re-checked.
pub fn run_pipeline(
    paths: &VaultPaths,
    settings: &Settings,
    reasoner: &dyn Reasoner,
    dry_run: bool,
) -> Result<RunSummary, PipelineError> {
    run_pipeline_at(paths, settings, reasoner, dry_run, now_utc())
}

pub fn run_pipeline_at(
    paths: &VaultPaths,
    settings: &Settings,
    reasoner: &dyn Reasoner,
    dry_run: bool,
    now: DateTime<Utc>,
) -> Result<RunSummary, PipelineError> {
    let mut summary = RunSummary::default();

    phase_initialize(paths, now)?;

    let tasks = phase_analyze(paths, &mut summary, dry_run);
    if tasks.is_empty() {
        logging::log(&paths.root, "no tasks to process — updating dashboard");
        if !dry_run {
            dashboard::update_dashboard(paths, &summary, now);
        }
        return Ok(summary);
    }

    let planned = phase_plan(paths, tasks, &mut summary, dry_run, now);

    logging::log(
        &paths.root,
        &format!("Phase 4: Route & Execute ({} valid task(s))", planned.len()),
    );
    let mut completed = Vec::new();
    for (task, plan) in &planned {
        let outcome = route_task(paths, settings, task, plan.as_ref(), reasoner, dry_run, now);
        logging::log(
            &paths.root,
            &format!("{}: {}", task.id, outcome.label()),
        );
        match outcome {
            TaskOutcome::Completed { .. } => {
                summary.processed += 1;
                completed.push(task);
            }
            TaskOutcome::PendingApproval { .. } => summary.pending_approval += 1,
            TaskOutcome::Failed { details } => {
                summary.failed += 1;
                dashboard::record_alert(
                    paths,
                    &format!("TASK FAILED — {}: {details}", task.filename),
                    now,
                );
            }
            TaskOutcome::DryRun => {}
        }
    }

    logging::log(
        &paths.root,
        &format!("Phase 5: Complete ({} task(s))", completed.len()),
    );
    for task in completed {
        archive_task(paths, task, &mut summary);
    }

    if !dry_run {
        dashboard::update_dashboard(paths, &summary, now);
    }

    logging::log(
        &paths.root,
        &format!("pipeline complete — {}", summary.to_json()),
    );
    Ok(summary)
}

/// Missing policy or status documents halt the pass before any task is
/// touched.
fn phase_initialize(paths: &VaultPaths, now: DateTime<Utc>) -> Result<(), PipelineError> {
    logging::log(&paths.root, "Phase 1: Initialize");

    if !paths.handbook.is_file() {
        logging::log(&paths.root, "FATAL: handbook not found — halting");
        dashboard::record_alert(
            paths,
            "HALT — Company_Handbook.md missing, cannot load policies",
            now,
        );
        return Err(PipelineError::MissingHandbook {
            path: paths.handbook.display().to_string(),
        });
    }
    if !paths.dashboard.is_file() {
        logging::log(&paths.root, "FATAL: dashboard not found — halting");
        return Err(PipelineError::MissingDashboard {
            path: paths.dashboard.display().to_string(),
        });
    }

    paths.ensure_directories()?;

    match std::fs::read_to_string(&paths.handbook) {
        Ok(handbook) => logging::log(
            &paths.root,
            &format!("handbook loaded ({} bytes)", handbook.len()),
        ),
        Err(err) => logging::log(&paths.root, &format!("WARNING: could not read handbook: {err}")),
    }

    Ok(())
}

/// Scans and classifies the inbox. A task already marked completed is the
/// residue of a crash between rewrite and archival; it is relocated instead
/// of re-executed.
fn phase_analyze(paths: &VaultPaths, summary: &mut RunSummary, dry_run: bool) -> Vec<LoadedTask> {
    logging::log(&paths.root, "Phase 2: Analyze");

    let tasks = match task::scan_inbox(paths) {
        Ok(tasks) => tasks,
        Err(err) => {
            logging::log(&paths.root, &format!("error scanning inbox: {err}"));
            return Vec::new();
        }
    };

    let mut batch = Vec::new();
    for task in tasks {
        if task.status() == Some(TaskStatus::Completed) {
            if dry_run {
                logging::log(
                    &paths.root,
                    &format!("[dry-run] would archive completed task {}", task.filename),
                );
            } else {
                archive_task(paths, &task, summary);
            }
            continue;
        }
        batch.push(task);
    }

    if !batch.is_empty() {
        let described: Vec<String> = batch
            .iter()
            .map(|t| {
                format!(
                    "{}({},{})",
                    t.id,
                    t.category,
                    t.frontmatter.priority
                )
            })
            .collect();
        logging::log(
            &paths.root,
            &format!("analyzed {} task(s): {}", batch.len(), described.join(", ")),
        );
    }
    batch
}

/// Validates each task and persists a plan for the valid ones. Schema
/// violations reject the task from this pass only; it stays in the inbox.
fn phase_plan(
    paths: &VaultPaths,
    tasks: Vec<LoadedTask>,
    summary: &mut RunSummary,
    dry_run: bool,
    now: DateTime<Utc>,
) -> Vec<(LoadedTask, Option<CreatedPlan>)> {
    logging::log(
        &paths.root,
        &format!("Phase 3: Plan ({} task(s))", tasks.len()),
    );

    let mut planned = Vec::new();
    for task in tasks {
        let violations = task::validate_schema(&task);
        if !violations.is_empty() {
            let rendered = task::validate::render_violations(&violations);
            logging::log(
                &paths.root,
                &format!("SCHEMA FAILURE — {}: {rendered}", task.filename),
            );
            summary.failed += 1;
            if !dry_run {
                dashboard::record_alert(
                    paths,
                    &format!("SCHEMA FAILURE — `{}` : {rendered}", task.filename),
                    now,
                );
            }
            continue;
        }

        if dry_run {
            planned.push((task, None));
            continue;
        }

        match generate_plan_at(paths, &task, now) {
            Ok(plan) => {
                logging::log(&paths.root, &format!("plan created: {}", plan.file));
                planned.push((task, Some(plan)));
            }
            Err(err) => {
                logging::log(
                    &paths.root,
                    &format!("ERROR creating plan for {}: {err}", task.id),
                );
                summary.failed += 1;
                dashboard::record_alert(
                    paths,
                    &format!("TASK FAILED — {}: cannot create plan: {err}", task.filename),
                    now,
                );
            }
        }
    }
    planned
}

/// Relocation failure is logged but not counted as a task failure; the
/// completed document stays in place and a later pass retries the move.
fn archive_task(paths: &VaultPaths, task: &LoadedTask, summary: &mut RunSummary) {
    match relocate_unique(&task.path, &paths.done) {
        Ok(dst) => {
            summary.archived += 1;
            logging::log(
                &paths.root,
                &format!(
                    "moved {} → Done/{}",
                    task.filename,
                    dst.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
                ),
            );
        }
        Err(err) => {
            logging::log(
                &paths.root,
                &format!("ERROR moving {} to Done: {err}", task.filename),
            );
        }
    }
}
