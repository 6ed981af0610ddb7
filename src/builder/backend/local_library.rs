//! Bundled compiler archive run through the Java launcher.

use std::path::PathBuf;

use crate::builder::directives::Directive;
use crate::builder::workspace::TempWorkspace;
use crate::core::error::{MinifyError, Result};
use crate::util::config::ToolchainSettings;
use crate::util::process::ProcessBuilder;

use super::local_binary::{require_workspace, run_staged};
use super::{compiler_args, BackendKind, CompilationBackend};

/// Runs `java -jar <compiler.jar>` with the same file handoff as
/// [`LocalBinaryBackend`](super::LocalBinaryBackend).
#[derive(Debug, Clone)]
pub struct LocalLibraryBackend {
    java: PathBuf,
    jar: Option<PathBuf>,
}

impl LocalLibraryBackend {
    pub fn new(java: impl Into<PathBuf>, jar: Option<PathBuf>) -> Self {
        LocalLibraryBackend {
            java: java.into(),
            jar,
        }
    }

    pub fn from_settings(settings: &ToolchainSettings) -> Self {
        LocalLibraryBackend::new(settings.java(), settings.compiler_jar())
    }

    fn resolve_jar(&self) -> Result<&PathBuf> {
        match &self.jar {
            Some(jar) if jar.is_file() => Ok(jar),
            Some(jar) => Err(MinifyError::backend(
                BackendKind::LocalLibrary,
                format!(
                    "bundled compiler not found at {}\n\
                     help: install closure-compiler, or set `toolchain.compiler_jar` in .minify/config.toml",
                    jar.display()
                ),
            )),
            None => Err(MinifyError::backend(
                BackendKind::LocalLibrary,
                "no location for the bundled compiler; set `toolchain.compiler_jar` in .minify/config.toml",
            )),
        }
    }
}

impl CompilationBackend for LocalLibraryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalLibrary
    }

    fn compile(
        &self,
        source: &str,
        directives: &[Directive],
        workspace: Option<&TempWorkspace>,
    ) -> Result<String> {
        let workspace = require_workspace(self.kind(), workspace)?;
        let jar = self.resolve_jar()?;
        let process = ProcessBuilder::new(&self.java)
            .arg("-jar")
            .arg(jar)
            .args(compiler_args(directives, workspace));
        run_staged(self.kind(), &process, source, workspace)
    }
}
