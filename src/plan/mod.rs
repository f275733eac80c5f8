use crate::approval::requires_approval;
use crate::config::VaultPaths;
use crate::docstore::{self, check_all_items, render_document, split_document, DocError};
use crate::shared::time::{file_ts, iso_ts, now_utc};
use crate::task::{Category, LoadedTask};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Informational complexity tier derived from raw document length; it never
/// drives branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn from_len(len: usize) -> Self {
        if len < 500 {
            Self::Simple
        } else if len < 1500 {
            Self::Moderate
        } else {
            Self::Complex
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepGate {
    Auto,
    Review,
}

impl StepGate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Review => "review",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub description: &'static str,
    pub gate: StepGate,
}

fn step(description: &'static str, gate: StepGate) -> PlanStep {
    PlanStep { description, gate }
}

/// Fixed per-category step template. Gated categories carry `review` steps at
/// their sensitive checkpoints; file and general plans run fully automatic.
pub fn steps_for_category(category: Category) -> Vec<PlanStep> {
    match category {
        Category::Email => {
            let draft_gate = if requires_approval(None, Category::Email) {
                StepGate::Review
            } else {
                StepGate::Auto
            };
            vec![
                step("Read and parse email content", StepGate::Auto),
                step("Extract key requests and action items", StepGate::Auto),
                step("Determine if response is needed", StepGate::Auto),
                step("Draft response or summary", draft_gate),
            ]
        }
        Category::Marketing => vec![
            step("Analyze marketing objective and audience", StepGate::Auto),
            step("Generate post content", StepGate::Auto),
            step("Review post for compliance and tone", StepGate::Review),
            step("Submit for publishing approval", StepGate::Review),
        ],
        Category::Finance => vec![
            step("Parse financial data and amounts", StepGate::Auto),
            step("Validate calculations and references", StepGate::Auto),
            step("Prepare financial action", StepGate::Review),
            step("Execute financial transaction", StepGate::Review),
        ],
        Category::File => vec![
            step("Analyze file content and metadata", StepGate::Auto),
            step("Determine required processing action", StepGate::Auto),
            step("Execute processing and write result", StepGate::Auto),
        ],
        Category::Message | Category::General => vec![
            step("Analyze task requirements", StepGate::Auto),
            step("Research and reason through objective", StepGate::Auto),
            step("Produce concrete result", StepGate::Auto),
        ],
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanFrontmatter {
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub task_type: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub complexity: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub source_file: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl PlanFrontmatter {
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPlan {
    pub file: String,
    pub path: PathBuf,
}

pub fn generate_plan(paths: &VaultPaths, task: &LoadedTask) -> Result<CreatedPlan, DocError> {
    generate_plan_at(paths, task, now_utc())
}

/// Renders and persists one plan document for a validated task.
pub fn generate_plan_at(
    paths: &VaultPaths,
    task: &LoadedTask,
    now: DateTime<Utc>,
) -> Result<CreatedPlan, DocError> {
    let complexity = Complexity::from_len(task.content_len);
    let steps = steps_for_category(task.category);
    let content = render_plan_document(task, complexity, &steps, now);

    let path = docstore::unique_doc_path(
        &paths.plans,
        &format!("PLAN_{}_{}", task.id, file_ts(now)),
    );
    docstore::write_document(&path, &content)?;

    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(CreatedPlan { file, path })
}

/// Marks a plan completed and checks off its steps. A missing plan file is a
/// no-op; the task outcome does not depend on it.
pub fn complete_plan(paths: &VaultPaths, plan_file: &str) -> Result<(), DocError> {
    let path = paths.plans.join(plan_file);
    if !path.is_file() {
        return Ok(());
    }

    let content = docstore::read_document(&path)?;
    let Some((yaml, body)) = split_document(&content) else {
        return Err(DocError::Frontmatter {
            path: path.display().to_string(),
        });
    };
    let mut frontmatter =
        PlanFrontmatter::parse(yaml).map_err(|e| docstore::parse_err(&path, e))?;
    frontmatter.status = "completed".to_string();

    let yaml = frontmatter
        .to_yaml()
        .map_err(|source| DocError::Serialize {
            path: path.display().to_string(),
            source,
        })?;
    docstore::write_document(&path, &render_document(&yaml, &check_all_items(body)))
}

fn render_plan_document(
    task: &LoadedTask,
    complexity: Complexity,
    steps: &[PlanStep],
    now: DateTime<Utc>,
) -> String {
    let steps_md = steps
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "- [ ] **Step {}**: {} `[{}]`",
                i + 1,
                s.description,
                s.gate.as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let review_steps: Vec<String> = steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.gate == StepGate::Review)
        .map(|(i, s)| format!("- Step {} requires review: {}", i + 1, s.description))
        .collect();
    let gates_md = if review_steps.is_empty() {
        "- No approval gates — all steps are autonomous.".to_string()
    } else {
        review_steps.join("\n")
    };

    let title_summary: String = task.summary.chars().take(80).collect();
    let ts = iso_ts(now);

    format!(
        "---\n\
        task_id: {task_id}\n\
        task_type: {task_type}\n\
        priority: {priority}\n\
        complexity: {complexity}\n\
        status: pending\n\
        created: {ts}\n\
        source_file: {source_file}\n\
        ---\n\
        \n\
        # Plan: Process {task_type} task — {title_summary}\n\
        \n\
        ## Objective\n\
        {summary}\n\
        \n\
        ## Context\n\
        - **Task ID**: {task_id}\n\
        - **Type**: {task_type}\n\
        - **Priority**: {priority}\n\
        - **Source file**: {source_file}\n\
        \n\
        ## Steps\n\
        \n\
        {steps_md}\n\
        \n\
        ## Approval Gates\n\
        {gates_md}\n\
        \n\
        ## Completion Criteria\n\
        - All steps executed or approved\n\
        - Result written to task file\n\
        - Task moved to Done/\n",
        task_id = task.id,
        task_type = task.category,
        priority = task.frontmatter.priority,
        complexity = complexity.as_str(),
        source_file = task.filename,
        summary = task.summary,
    )
}
