use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Writes `content` to `path` so that a concurrent reader either sees the
/// previous document or the new one, never a partial write. The temporary
/// file lives in the destination directory so the final rename stays on one
/// filesystem.
pub fn atomic_write_file(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("path has no parent"))?;
    let tmp_name = format!(
        ".{}.tmp-{}-{}",
        path.file_name().and_then(|v| v.to_str()).unwrap_or("doc"),
        std::process::id(),
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
    );
    let tmp_path = parent.join(tmp_name);

    {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    sync_parent_dir(parent)?;
    Ok(())
}

/// Moves `src` into `dst_dir`, appending `_1`, `_2`, ... to the file stem
/// until the destination name is free.
pub fn relocate_unique(src: &Path, dst_dir: &Path) -> std::io::Result<PathBuf> {
    let file_name = src
        .file_name()
        .and_then(|v| v.to_str())
        .ok_or_else(|| std::io::Error::other("source file missing name"))?;

    let mut dst = dst_dir.join(file_name);
    if dst.exists() {
        let path = Path::new(file_name);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("document");
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("md");
        let mut counter = 1u64;
        loop {
            let candidate = dst_dir.join(format!("{stem}_{counter}.{ext}"));
            if !candidate.exists() {
                dst = candidate;
                break;
            }
            counter += 1;
        }
    }

    fs::rename(src, &dst)?;
    Ok(dst)
}

#[cfg(unix)]
fn sync_parent_dir(parent: &Path) -> std::io::Result<()> {
    fs::File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent_dir(_parent: &Path) -> std::io::Result<()> {
    Ok(())
}
