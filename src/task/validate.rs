use crate::docstore::{extract_section, has_unchecked_item};
use crate::task::{LoadedTask, Priority, TaskStatus};

pub const REQUIRED_SECTIONS: [&str; 3] = [
    super::SECTION_DESCRIPTION,
    super::SECTION_OUTCOME,
    super::SECTION_CHECKLIST,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    UnparsableFrontmatter { detail: String },
    MissingField { field: &'static str },
    InvalidPriority { value: String },
    UnexpectedStatus { value: String },
    MissingSection { heading: &'static str },
    NoUncheckedItems,
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnparsableFrontmatter { detail } => {
                write!(f, "unparsable frontmatter: {detail}")
            }
            Self::MissingField { field } => write!(f, "missing frontmatter field: {field}"),
            Self::InvalidPriority { value } => write!(f, "invalid priority: {value}"),
            Self::UnexpectedStatus { value } => {
                write!(f, "status is '{value}', expected 'pending'")
            }
            Self::MissingSection { heading } => {
                write!(f, "missing or empty section: ## {heading}")
            }
            Self::NoUncheckedItems => write!(f, "no unchecked checklist items found"),
        }
    }
}

pub fn render_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checks a task against the required schema. Zero violations means the task
/// proceeds to planning; any violation rejects it from this pass without
/// deleting it.
pub fn validate_schema(task: &LoadedTask) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();

    if let Some(detail) = &task.frontmatter_error {
        violations.push(SchemaViolation::UnparsableFrontmatter {
            detail: detail.clone(),
        });
    }

    let fm = &task.frontmatter;
    for (field, value) in [
        ("type", &fm.kind),
        ("priority", &fm.priority),
        ("status", &fm.status),
        ("created", &fm.created),
        ("source", &fm.source),
    ] {
        if value.trim().is_empty() {
            violations.push(SchemaViolation::MissingField { field });
        }
    }

    if !fm.priority.trim().is_empty() && Priority::parse(&fm.priority).is_none() {
        violations.push(SchemaViolation::InvalidPriority {
            value: fm.priority.clone(),
        });
    }

    if !fm.status.trim().is_empty() && task.status() != Some(TaskStatus::Pending) {
        violations.push(SchemaViolation::UnexpectedStatus {
            value: fm.status.clone(),
        });
    }

    for heading in REQUIRED_SECTIONS {
        let present = extract_section(&task.body, heading)
            .map(|text| !text.is_empty())
            .unwrap_or(false);
        if !present {
            violations.push(SchemaViolation::MissingSection { heading });
        }
    }

    if !has_unchecked_item(&task.body) {
        violations.push(SchemaViolation::NoUncheckedItems);
    }

    violations
}
