pub mod frontmatter;
pub mod sections;

pub use frontmatter::{render_document, split_document};
pub use sections::{
    check_all_items, extract_section, has_unchecked_item, insert_before_heading,
};

use crate::shared::fs_atomic::atomic_write_file;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("document io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("missing or unterminated frontmatter in {path}")]
    Frontmatter { path: String },
    #[error("invalid frontmatter in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize frontmatter for {path}: {source}")]
    Serialize {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

pub fn io_err(path: &Path, source: std::io::Error) -> DocError {
    DocError::Io {
        path: path.display().to_string(),
        source,
    }
}

pub fn parse_err(path: &Path, source: serde_yaml::Error) -> DocError {
    DocError::Parse {
        path: path.display().to_string(),
        source,
    }
}

pub fn read_document(path: &Path) -> Result<String, DocError> {
    std::fs::read_to_string(path).map_err(|e| io_err(path, e))
}

/// All document persistence goes through the scoped atomic write so a
/// concurrent reader never observes a half-written document.
pub fn write_document(path: &Path, content: &str) -> Result<(), DocError> {
    atomic_write_file(path, content.as_bytes()).map_err(|e| io_err(path, e))
}

/// Picks `stem.md` inside `dir`, falling back to `stem_1.md`, `stem_2.md`, ...
/// when a producer racing on the same timestamp already took the name.
pub fn unique_doc_path(dir: &Path, stem: &str) -> PathBuf {
    let candidate = dir.join(format!("{stem}.md"));
    if !candidate.exists() {
        return candidate;
    }
    let mut counter = 1u64;
    loop {
        let candidate = dir.join(format!("{stem}_{counter}.md"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Markdown documents in a directory, filename-sorted, dotfiles skipped.
pub fn sorted_markdown_paths(dir: &Path) -> Result<Vec<PathBuf>, DocError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || !name.ends_with(".md") {
            continue;
        }
        paths.push(path);
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn unique_doc_path_suffixes_until_free() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("DOC.md"), "a").expect("write");
        fs::write(tmp.path().join("DOC_1.md"), "b").expect("write");

        let path = unique_doc_path(tmp.path(), "DOC");
        assert_eq!(path, tmp.path().join("DOC_2.md"));
    }

    #[test]
    fn sorted_markdown_paths_skips_dotfiles_and_other_extensions() {
        let tmp = tempdir().expect("tempdir");
        fs::write(tmp.path().join("b.md"), "").expect("write");
        fs::write(tmp.path().join("a.md"), "").expect("write");
        fs::write(tmp.path().join(".hidden.md"), "").expect("write");
        fs::write(tmp.path().join("c.txt"), "").expect("write");

        let names: Vec<_> = sorted_markdown_paths(tmp.path())
            .expect("scan")
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.md", "b.md"]);
    }
}
