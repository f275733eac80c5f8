/// Splits a document into its raw YAML frontmatter and markdown body.
///
/// The on-disk shape is a `---` delimited key/value block followed by the
/// body. Returns `None` when the frontmatter is missing or unterminated; the
/// caller decides whether that is a violation or a skip.
pub fn split_document(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix("---\n")?;
    let end = rest.find("\n---")?;
    let yaml = &rest[..end];
    let mut body = &rest[end + "\n---".len()..];
    // The closing delimiter must terminate its line.
    if let Some(after) = body.strip_prefix('\n') {
        body = after;
    } else if !body.is_empty() {
        return None;
    }
    let body = body.strip_prefix('\n').unwrap_or(body);
    Some((yaml, body))
}

/// Reassembles a document from serialized frontmatter and a body.
pub fn render_document(frontmatter_yaml: &str, body: &str) -> String {
    let yaml = frontmatter_yaml.trim_end_matches('\n');
    let body = body.trim_start_matches('\n');
    format!("---\n{yaml}\n---\n\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_separates_frontmatter_from_body() {
        let raw = "---\ntype: task\nstatus: pending\n---\n\n# Title\n\n## Section\nbody\n";
        let (yaml, body) = split_document(raw).expect("split");
        assert_eq!(yaml, "type: task\nstatus: pending");
        assert_eq!(body, "# Title\n\n## Section\nbody\n");
    }

    #[test]
    fn split_rejects_missing_or_unterminated_frontmatter() {
        assert!(split_document("# Just a body\n").is_none());
        assert!(split_document("---\ntype: task\nno closing delimiter").is_none());
    }

    #[test]
    fn render_then_split_round_trips() {
        let rendered = render_document("type: task\nstatus: pending\n", "## Section\nbody\n");
        let (yaml, body) = split_document(&rendered).expect("split");
        assert_eq!(yaml, "type: task\nstatus: pending");
        assert_eq!(body, "## Section\nbody\n");
    }
}
