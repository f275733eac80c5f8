use crate::task::TaskFrontmatter;
use serde::{Deserialize, Serialize};

/// Closed set of task domains. `General` is the explicit fallback rather than
/// a free-form string fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Email,
    Message,
    File,
    Finance,
    Marketing,
    General,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Message => "message",
            Self::File => "file",
            Self::Finance => "finance",
            Self::Marketing => "marketing",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Producer identifier the directory watcher stamps into `source`.
const FILE_WATCHER_SOURCE: &str = "watcher.py";

const MESSAGE_KEYWORDS: [&str; 4] = ["message", "chat", "notification", "alert"];
const FINANCE_KEYWORDS: [&str; 4] = ["finance", "invoice", "payment", "budget"];
const MARKETING_KEYWORDS: [&str; 4] = ["linkedin", "marketing", "social", "post"];

/// Rule-ordered keyword classification over the task's metadata and
/// description. First matching rule wins, so the precedence is fixed:
/// email > message > file > finance > marketing > general.
pub fn classify(frontmatter: &TaskFrontmatter, description: &str) -> Category {
    let kind = frontmatter.kind.to_lowercase();
    let source = frontmatter.source.to_lowercase();
    let desc = description.to_lowercase();

    if kind.contains("email") || source.contains("email") || desc.contains("email") || desc.contains("inbox") {
        return Category::Email;
    }
    if MESSAGE_KEYWORDS.iter().any(|kw| kind.contains(kw)) {
        return Category::Message;
    }
    if kind.contains("file") || source == FILE_WATCHER_SOURCE || desc.contains("file detect") {
        return Category::File;
    }
    if FINANCE_KEYWORDS
        .iter()
        .any(|kw| kind.contains(kw) || desc.contains(kw))
    {
        return Category::Finance;
    }
    if MARKETING_KEYWORDS
        .iter()
        .any(|kw| kind.contains(kw) || desc.contains(kw))
    {
        return Category::Marketing;
    }
    Category::General
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontmatter(kind: &str, source: &str) -> TaskFrontmatter {
        TaskFrontmatter {
            kind: kind.to_string(),
            source: source.to_string(),
            ..TaskFrontmatter::default()
        }
    }

    #[test]
    fn email_outranks_every_other_category() {
        // Both email and finance keywords present: email wins.
        let fm = frontmatter("email", "poller");
        assert_eq!(classify(&fm, "pay the invoice"), Category::Email);

        let fm = frontmatter("", "");
        assert_eq!(classify(&fm, "check the inbox for the budget"), Category::Email);
    }

    #[test]
    fn message_keywords_match_type_only() {
        let fm = frontmatter("chat_notification", "");
        assert_eq!(classify(&fm, ""), Category::Message);

        // A chat keyword in the description alone does not classify as message.
        let fm = frontmatter("", "");
        assert_eq!(classify(&fm, "a chat transcript"), Category::General);
    }

    #[test]
    fn file_matches_type_source_or_detection_phrase() {
        assert_eq!(classify(&frontmatter("file_drop", ""), ""), Category::File);
        assert_eq!(classify(&frontmatter("", "watcher.py"), ""), Category::File);
        assert_eq!(
            classify(&frontmatter("", ""), "new file detected in staging"),
            Category::File
        );
    }

    #[test]
    fn finance_beats_marketing() {
        let fm = frontmatter("", "");
        assert_eq!(
            classify(&fm, "prepare the invoice for the linkedin campaign"),
            Category::Finance
        );
    }

    #[test]
    fn marketing_then_general_fallback() {
        let fm = frontmatter("", "");
        assert_eq!(classify(&fm, "draft a social post"), Category::Marketing);
        assert_eq!(classify(&fm, "tidy the meeting notes"), Category::General);
    }

    #[test]
    fn classification_is_case_insensitive() {
        let fm = frontmatter("EMAIL", "");
        assert_eq!(classify(&fm, ""), Category::Email);
    }
}
