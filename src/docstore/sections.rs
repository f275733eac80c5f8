/// Text under `## heading`, up to the next `## ` heading or end of body,
/// trimmed. `None` when the heading is absent.
pub fn extract_section(body: &str, heading: &str) -> Option<String> {
    let mut collected: Vec<&str> = Vec::new();
    let mut inside = false;

    for line in body.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            if inside {
                break;
            }
            inside = rest.trim_end() == heading;
            continue;
        }
        if inside {
            collected.push(line);
        }
    }

    if !inside {
        return None;
    }
    Some(collected.join("\n").trim().to_string())
}

/// Inserts `block` immediately before `## heading`, or appends it when the
/// heading does not exist.
pub fn insert_before_heading(body: &str, heading: &str, block: &str) -> String {
    let marker = format!("## {heading}");
    let mut offset = 0usize;
    for line in body.lines() {
        if line.trim_end() == marker {
            let before = &body[..offset];
            let after = &body[offset..];
            return format!("{before}{}\n\n{after}", block.trim_end());
        }
        offset += line.len() + 1;
    }
    format!("{}\n{}\n", body.trim_end_matches('\n'), block.trim_end())
}

pub fn has_unchecked_item(body: &str) -> bool {
    body.contains("- [ ]")
}

/// Flips every unchecked checklist box to checked.
pub fn check_all_items(body: &str) -> String {
    body.replace("- [ ]", "- [x]")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "## Task Description\nSort the inbox.\n\n## Required Outcome\nA sorted inbox.\n\n## Processing Checklist\n- [ ] triage\n- [x] already done\n";

    #[test]
    fn extract_section_stops_at_next_heading() {
        assert_eq!(
            extract_section(BODY, "Task Description").as_deref(),
            Some("Sort the inbox.")
        );
        assert_eq!(
            extract_section(BODY, "Required Outcome").as_deref(),
            Some("A sorted inbox.")
        );
        assert_eq!(extract_section(BODY, "Nonexistent"), None);
    }

    #[test]
    fn extract_section_reports_empty_sections_as_empty() {
        let body = "## Task Description\n\n## Required Outcome\ntext\n";
        assert_eq!(extract_section(body, "Task Description").as_deref(), Some(""));
    }

    #[test]
    fn insert_before_heading_lands_above_the_checklist() {
        let updated = insert_before_heading(BODY, "Processing Checklist", "## Result\ndone");
        let result_at = updated.find("## Result").expect("result present");
        let checklist_at = updated.find("## Processing Checklist").expect("checklist");
        assert!(result_at < checklist_at);
        assert!(updated.contains("## Result\ndone\n\n## Processing Checklist"));
    }

    #[test]
    fn insert_before_heading_appends_when_heading_missing() {
        let updated = insert_before_heading("## Only Section\ntext\n", "Absent", "## Result\ndone");
        assert!(updated.ends_with("## Result\ndone\n"));
    }

    #[test]
    fn check_all_items_leaves_checked_boxes_alone() {
        let updated = check_all_items(BODY);
        assert!(!updated.contains("- [ ]"));
        assert_eq!(updated.matches("- [x]").count(), 2);
        assert!(!has_unchecked_item(&updated));
        assert!(has_unchecked_item(BODY));
    }
}
