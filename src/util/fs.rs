//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Paths from `paths` that are not existing files, in order.
pub fn missing_files<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.is_file())
        .map(Path::to_path_buf)
        .collect()
}

/// Directory holding `file`, or `.` for a bare file name.
pub fn parent_or_current(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("release").join("js");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_read_error_names_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_to_string(&tmp.path().join("header.js")).unwrap_err();
        assert!(err.to_string().contains("header.js"));
    }

    #[test]
    fn test_missing_files() {
        let tmp = TempDir::new().unwrap();
        let here = tmp.path().join("here.js");
        std::fs::write(&here, "").unwrap();
        let gone = tmp.path().join("gone.js");

        assert_eq!(missing_files(&[here, gone.clone(), tmp.path().to_path_buf()]), vec![
            gone,
            tmp.path().to_path_buf()
        ]);
    }

    #[test]
    fn test_parent_or_current() {
        assert_eq!(
            parent_or_current(Path::new("release/app.min.js")),
            PathBuf::from("release")
        );
        assert_eq!(parent_or_current(Path::new("app.min.js")), PathBuf::from("."));
    }
}
