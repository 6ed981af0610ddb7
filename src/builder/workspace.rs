//! Temporary files used to hand source to and from a local compiler.

use std::path::{Path, PathBuf};

use crate::core::error::{MinifyError, Result};

/// Pre-compilation file name inside the work directory.
pub const TMP_FILE: &str = ".Minify.tmp.js";

/// Post-compilation file name inside the work directory.
pub const OUTPUT_FILE: &str = ".Minify.output.js";

/// Scoped pair of temp files for one build.
///
/// Dropping the workspace removes the output file, and the staged source
/// file unless `keep` was requested. Names are fixed, so only one build may
/// use a given work directory at a time.
#[derive(Debug)]
pub struct TempWorkspace {
    source_path: PathBuf,
    output_path: PathBuf,
    keep_source: bool,
}

impl TempWorkspace {
    pub fn new(work_directory: &Path, keep_source: bool) -> Self {
        TempWorkspace {
            source_path: work_directory.join(TMP_FILE),
            output_path: work_directory.join(OUTPUT_FILE),
            keep_source,
        }
    }

    /// Path the compiler reads from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Path the compiler writes to.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the source text to the pre-compilation file.
    pub fn stage(&self, source: &str) -> Result<()> {
        // A stale output from an earlier crashed build must not be mistaken
        // for this build's result.
        remove_if_exists(&self.output_path);
        std::fs::write(&self.source_path, source)
            .map_err(|e| MinifyError::io(&self.source_path, e))
    }

    /// Read the compiled output and delete the post-compilation file.
    pub fn take_output(&self) -> Result<String> {
        let code = std::fs::read_to_string(&self.output_path)
            .map_err(|e| MinifyError::io(&self.output_path, e))?;
        remove_if_exists(&self.output_path);
        Ok(code)
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        remove_if_exists(&self.output_path);
        if self.keep_source {
            tracing::debug!("keeping {}", self.source_path.display());
        } else {
            remove_if_exists(&self.source_path);
        }
    }
}

fn remove_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!("removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("failed to remove {}: {}", path.display(), e),
    }
}
