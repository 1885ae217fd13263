//! Filesystem primitives used by the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{io_context, Result};

/// Create `path` and all missing parents.
pub fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(io_context(format!("create {}", path.display())))
}

/// Write `content` as UTF-8 to `dir/file`. `dir` must already exist.
pub fn write_text(dir: &Path, file: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(file);
    fs::write(&path, content.as_bytes()).map_err(io_context(format!("write {}", path.display())))?;
    Ok(path)
}

/// Remove `path` if present. Returns whether a file was removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_context(format!("remove {}", path.display()))(e)),
    }
}

/// Whether `dir` exists and holds at least one entry.
pub fn has_entries(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    let mut entries = fs::read_dir(dir).map_err(io_context(format!("read {}", dir.display())))?;
    Ok(entries.next().is_some())
}

/// Recursively copy `src` into `dst`, merging with whatever is already there.
///
/// Files with the same relative path are overwritten; files only present in
/// `dst` are left alone. Symlinks are followed. Returns the number of files
/// copied.
pub fn copy_tree_merge(src: &Path, dst: &Path) -> Result<usize> {
    create_dir_all(dst)?;
    let mut copied = 0;
    for entry in fs::read_dir(src).map_err(io_context(format!("read {}", src.display())))? {
        let entry = entry.map_err(io_context(format!("read {}", src.display())))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let meta = fs::metadata(&from).map_err(io_context(format!("stat {}", from.display())))?;
        if meta.is_dir() {
            copied += copy_tree_merge(&from, &to)?;
        } else if meta.is_file() {
            fs::copy(&from, &to).map_err(io_context(format!(
                "copy {} -> {}",
                from.display(),
                to.display()
            )))?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_text_requires_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing");
        assert!(write_text(&missing, "a.txt", "x").is_err());
        create_dir_all(&missing).unwrap();
        let path = write_text(&missing, "a.txt", "x").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "x");
    }

    #[test]
    fn test_remove_file_if_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_text(tmp.path(), "a.txt", "x").unwrap();
        assert!(remove_file_if_exists(&path).unwrap());
        assert!(!path.exists());
        assert!(!remove_file_if_exists(&path).unwrap());
    }

    #[test]
    fn test_copy_tree_merge_copies_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("data").join("raw")).unwrap();
        fs::write(src.join("main.ipynb"), "{}").unwrap();
        fs::write(src.join("data").join("raw").join("a.csv"), "1,2").unwrap();

        let dst = tmp.path().join("dst");
        assert_eq!(copy_tree_merge(&src, &dst).unwrap(), 2);
        assert_eq!(fs::read_to_string(dst.join("main.ipynb")).unwrap(), "{}");
        assert_eq!(
            fs::read_to_string(dst.join("data").join("raw").join("a.csv")).unwrap(),
            "1,2"
        );
    }

    #[test]
    fn test_copy_tree_merge_overwrites_and_keeps_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("main.ipynb"), "new").unwrap();
        fs::write(dst.join("main.ipynb"), "old").unwrap();
        fs::write(dst.join("stale.txt"), "left over").unwrap();

        copy_tree_merge(&src, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("main.ipynb")).unwrap(), "new");
        assert!(dst.join("stale.txt").exists());
    }

    #[test]
    fn test_has_entries() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!has_entries(&tmp.path().join("nope")).unwrap());
        assert!(!has_entries(tmp.path()).unwrap());
        fs::write(tmp.path().join("f"), "").unwrap();
        assert!(has_entries(tmp.path()).unwrap());
    }
}
