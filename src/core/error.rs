//! Build error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::builder::backend::BackendKind;

/// A fatal build failure.
///
/// Non-fatal conditions (missing sources, a failed binary probe, malformed
/// label blocks) never show up here; they are logged and surfaced as data
/// on the build output instead.
#[derive(Debug, Error)]
pub enum MinifyError {
    /// Malformed or incompatible option combination, detected before any I/O.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The compiler ran and rejected the input, or could not be run at all.
    #[error("{backend} compilation failed:\n{diagnostic}")]
    BackendExecution {
        backend: BackendKind,
        diagnostic: String,
    },

    /// Transport-level failure talking to the compilation service.
    #[error("compilation service request failed: {0}")]
    Network(String),

    #[error("failed to access `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MinifyError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        MinifyError::InvalidConfiguration(message.into())
    }

    pub(crate) fn backend(backend: BackendKind, diagnostic: impl Into<String>) -> Self {
        MinifyError::BackendExecution {
            backend,
            diagnostic: diagnostic.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MinifyError::Io {
            path: path.into(),
            source,
        }
    }

    /// Raw diagnostic text reported by the compiler, if this is a compile failure.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            MinifyError::BackendExecution { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

/// Result alias for build operations.
pub type Result<T> = std::result::Result<T, MinifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_keeps_raw_diagnostic() {
        let err = MinifyError::backend(BackendKind::LocalBinary, "input.js:3: ERROR - parse error");

        assert_eq!(err.diagnostic(), Some("input.js:3: ERROR - parse error"));
        let message = err.to_string();
        assert!(message.contains("local-binary"));
        assert!(message.contains("parse error"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = MinifyError::io(
            "/tmp/work/.Minify.tmp.js",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        assert!(err.to_string().contains(".Minify.tmp.js"));
        assert!(err.diagnostic().is_none());
    }
}
