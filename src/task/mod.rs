pub mod classify;
pub mod validate;

pub use classify::{classify, Category};
pub use validate::{validate_schema, SchemaViolation, REQUIRED_SECTIONS};

use crate::config::VaultPaths;
use crate::docstore::{self, extract_section, split_document, DocError};
use crate::shared::logging;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const SECTION_DESCRIPTION: &str = "Task Description";
pub const SECTION_OUTCOME: &str = "Required Outcome";
pub const SECTION_CHECKLIST: &str = "Processing Checklist";
pub const SECTION_RESULT: &str = "Result";
pub const SECTION_COMPLETION_NOTES: &str = "Completion Notes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// High sorts first in a batch.
    pub fn severity_rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Task frontmatter as written by producers. The core fields are typed at
/// validation time; `extra` preserves producer-specific fields (`email_from`,
/// ...) across a rewrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskFrontmatter {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub source: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl TaskFrontmatter {
    pub fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

/// One inbox document, read, parsed, and classified for a single pass.
#[derive(Debug, Clone)]
pub struct LoadedTask {
    pub id: String,
    pub filename: String,
    pub path: PathBuf,
    pub frontmatter: TaskFrontmatter,
    pub body: String,
    pub category: Category,
    pub summary: String,
    /// Full raw length, frontmatter included; drives the plan complexity tier.
    pub content_len: usize,
    /// Set when the frontmatter block was absent or unparsable; surfaces as a
    /// schema violation instead of being silently dropped.
    pub frontmatter_error: Option<String>,
}

impl LoadedTask {
    pub fn priority(&self) -> Option<Priority> {
        Priority::parse(&self.frontmatter.priority)
    }

    pub fn status(&self) -> Option<TaskStatus> {
        TaskStatus::parse(&self.frontmatter.status)
    }

    pub fn description(&self) -> String {
        extract_section(&self.body, SECTION_DESCRIPTION).unwrap_or_default()
    }

    pub fn required_outcome(&self) -> String {
        extract_section(&self.body, SECTION_OUTCOME).unwrap_or_default()
    }

    fn severity_rank(&self) -> u8 {
        self.priority().map(Priority::severity_rank).unwrap_or(2)
    }
}

/// Reads every task in `Needs_Action/`, classifies it, and returns the batch
/// in execution order. Unreadable documents are logged and skipped; they stay
/// in place for the next pass.
pub fn scan_inbox(paths: &VaultPaths) -> Result<Vec<LoadedTask>, DocError> {
    let mut tasks = Vec::new();

    for (idx, path) in docstore::sorted_markdown_paths(&paths.needs_action)?
        .into_iter()
        .enumerate()
    {
        let raw = match docstore::read_document(&path) {
            Ok(raw) => raw,
            Err(err) => {
                logging::log(&paths.root, &format!("WARNING: could not read task: {err}"));
                continue;
            }
        };
        let Some(filename) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            continue;
        };
        tasks.push(load_task(path, filename, &raw, idx + 1));
    }

    sort_batch(&mut tasks);
    Ok(tasks)
}

fn load_task(path: PathBuf, filename: String, raw: &str, index: usize) -> LoadedTask {
    let (frontmatter, body, frontmatter_error) = match split_document(raw) {
        Some((yaml, body)) => match TaskFrontmatter::parse(yaml) {
            Ok(fm) => (fm, body.to_string(), None),
            Err(err) => (
                TaskFrontmatter::default(),
                body.to_string(),
                Some(err.to_string()),
            ),
        },
        None => (
            TaskFrontmatter::default(),
            raw.to_string(),
            Some("missing frontmatter block".to_string()),
        ),
    };

    let description = extract_section(&body, SECTION_DESCRIPTION).unwrap_or_default();
    let summary: String = description
        .chars()
        .take(120)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string();
    let category = classify(&frontmatter, &description);

    LoadedTask {
        id: format!("NA-{index}"),
        filename,
        path,
        frontmatter,
        body,
        category,
        summary,
        content_len: raw.len(),
        frontmatter_error,
    }
}

/// Strict batch order: severity rank (high, medium, low), ties broken by
/// `created` ascending. Created timestamps are ISO-8601 so the string compare
/// is chronological.
pub fn sort_batch(tasks: &mut [LoadedTask]) {
    tasks.sort_by(|a, b| {
        a.severity_rank()
            .cmp(&b.severity_rank())
            .then_with(|| a.frontmatter.created.cmp(&b.frontmatter.created))
            .then_with(|| a.filename.cmp(&b.filename))
    });
}
