//! Source file concatenation.

use std::io;
use std::path::{Path, PathBuf};

use crate::core::error::{MinifyError, Result};

/// Concatenated sources plus the paths that could not be found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregatedSource {
    /// File contents joined in list order, with no separator
    pub text: String,
    /// Listed paths that did not exist, in list order
    pub missing: Vec<PathBuf>,
}

/// Concatenate the contents of `paths` in order.
///
/// A path that does not exist contributes nothing and is recorded in
/// [`AggregatedSource::missing`]; callers routinely pass optional sources.
/// A path that exists but cannot be read is still an error.
pub fn aggregate<P: AsRef<Path>>(paths: &[P]) -> Result<AggregatedSource> {
    let mut aggregated = AggregatedSource::default();

    for path in paths {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => aggregated.text.push_str(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("source file not found: {}", path.display());
                aggregated.missing.push(path.to_path_buf());
            }
            Err(e) => return Err(MinifyError::io(path, e)),
        }
    }

    Ok(aggregated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_aggregate_preserves_order_without_separator() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.js");
        let b = tmp.path().join("b.js");
        fs::write(&a, "var a = 1;").unwrap();
        fs::write(&b, "var b = 2;\n").unwrap();

        let result = aggregate(&[&b, &a]).unwrap();

        assert_eq!(result.text, "var b = 2;\nvar a = 1;");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_aggregate_reports_missing_files() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.js");
        let gone = tmp.path().join("gone.js");
        fs::write(&a, "A").unwrap();

        let result = aggregate(&[gone.clone(), a.clone(), gone.clone()]).unwrap();

        assert_eq!(result.text, "A");
        assert_eq!(result.missing, vec![gone.clone(), gone]);
    }

    #[test]
    fn test_aggregate_allows_duplicates() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.js");
        fs::write(&a, "x;").unwrap();

        let result = aggregate(&[&a, &a]).unwrap();
        assert_eq!(result.text, "x;x;");
    }

    #[test]
    fn test_aggregate_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();

        let err = aggregate(&[tmp.path()]).unwrap_err();
        assert!(matches!(err, MinifyError::Io { .. }));
    }

    #[test]
    fn test_aggregate_empty_list() {
        let paths: [PathBuf; 0] = [];
        assert_eq!(aggregate(&paths).unwrap(), AggregatedSource::default());
    }
}
