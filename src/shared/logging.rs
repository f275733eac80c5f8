use crate::shared::time::{iso_ts, now_utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn vault_log_path(vault_root: &Path) -> PathBuf {
    vault_root.join("Logs/vaultkeeper.log")
}

pub fn append_vault_log_line(vault_root: &Path, line: &str) -> std::io::Result<()> {
    let path = vault_log_path(vault_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    writeln!(file, "{line}")
}

/// Best-effort pipeline log line. Logging must never fail the pass.
pub fn log(vault_root: &Path, message: &str) {
    let line = format!("{} : [vaultkeeper] {message}", iso_ts(now_utc()));
    let _ = append_vault_log_line(vault_root, &line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_lines_accumulate_in_order() {
        let tmp = tempdir().expect("tempdir");
        log(tmp.path(), "first");
        log(tmp.path(), "second");

        let raw = fs::read_to_string(vault_log_path(tmp.path())).expect("read log");
        let lines: Vec<_> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[vaultkeeper] first"));
        assert!(lines[1].ends_with("[vaultkeeper] second"));
    }
}
