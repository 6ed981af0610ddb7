//! Installed `closure-compiler` executable.

use std::path::PathBuf;

use crate::builder::directives::Directive;
use crate::builder::workspace::TempWorkspace;
use crate::core::error::{MinifyError, Result};
use crate::util::process::ProcessBuilder;

use super::{compiler_args, BackendKind, CompilationBackend};

/// Runs a compiler executable found on PATH or configured explicitly.
#[derive(Debug, Clone)]
pub struct LocalBinaryBackend {
    program: PathBuf,
}

impl LocalBinaryBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        LocalBinaryBackend {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl CompilationBackend for LocalBinaryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::LocalBinary
    }

    fn compile(
        &self,
        source: &str,
        directives: &[Directive],
        workspace: Option<&TempWorkspace>,
    ) -> Result<String> {
        let workspace = require_workspace(self.kind(), workspace)?;
        let process = ProcessBuilder::new(&self.program).args(compiler_args(directives, workspace));
        run_staged(self.kind(), &process, source, workspace)
    }
}

pub(super) fn require_workspace(
    kind: BackendKind,
    workspace: Option<&TempWorkspace>,
) -> Result<&TempWorkspace> {
    workspace.ok_or_else(|| {
        MinifyError::backend(kind, "no work directory was provided to stage the source in")
    })
}

/// Stage the source, run `process`, and collect the output file.
///
/// Any stderr output counts as failure, even with a zero exit code.
pub(super) fn run_staged(
    kind: BackendKind,
    process: &ProcessBuilder,
    source: &str,
    workspace: &TempWorkspace,
) -> Result<String> {
    workspace.stage(source)?;

    tracing::debug!("running {}", process.display_command());

    let output = process
        .exec()
        .map_err(|e| MinifyError::backend(kind, format!("{:#}", e)))?;

    if !output.success() || !output.stderr.is_empty() {
        return Err(MinifyError::backend(kind, output.diagnostic()));
    }

    workspace.take_output()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::builder::directives::{Directive, OptimizationLevel};
    use crate::test_support::{
        failing_compiler, fake_compiler, noisy_compiler, recorded_args, write_script,
    };
    use tempfile::TempDir;

    fn simple() -> Vec<Directive> {
        vec![Directive::CompilationLevel(OptimizationLevel::Simple)]
    }

    #[test]
    fn test_compile_reads_output_file() {
        let tmp = TempDir::new().unwrap();
        let compiler = fake_compiler(tmp.path(), "closure-compiler");
        let ws = TempWorkspace::new(tmp.path(), false);

        let code = LocalBinaryBackend::new(&compiler)
            .compile("var a = 1;", &simple(), Some(&ws))
            .unwrap();

        assert_eq!(code, "/* compiled */var a = 1;");
        assert!(!ws.output_path().exists());

        let args = recorded_args(tmp.path());
        assert_eq!(&args[..2], ["--compilation_level", "SIMPLE_OPTIMIZATIONS"]);
        assert!(args.contains(&"--js_output_file".to_string()));
    }

    #[test]
    fn test_nonzero_exit_is_failure_with_stderr() {
        let tmp = TempDir::new().unwrap();
        let compiler = failing_compiler(tmp.path(), "closure-compiler");
        let ws = TempWorkspace::new(tmp.path(), false);

        let err = LocalBinaryBackend::new(&compiler)
            .compile("var = ;", &simple(), Some(&ws))
            .unwrap_err();

        assert!(err.diagnostic().unwrap().contains("Parse error"));
    }

    #[test]
    fn test_stderr_output_is_failure_even_on_success() {
        let tmp = TempDir::new().unwrap();
        let compiler = noisy_compiler(tmp.path(), "closure-compiler");
        let ws = TempWorkspace::new(tmp.path(), false);

        let err = LocalBinaryBackend::new(&compiler)
            .compile("var a;", &simple(), Some(&ws))
            .unwrap_err();

        assert!(matches!(
            err,
            MinifyError::BackendExecution {
                backend: BackendKind::LocalBinary,
                ..
            }
        ));
        assert!(err.diagnostic().unwrap().contains("WARNING"));
    }

    #[test]
    fn test_blank_stderr_is_failure() {
        let tmp = TempDir::new().unwrap();
        let compiler = write_script(
            tmp.path(),
            "closure-compiler",
            "for last; do :; done\ncat \"$last\" > \"$(dirname \"$last\")/.Minify.output.js\"\necho >&2\n",
        );
        let ws = TempWorkspace::new(tmp.path(), false);

        let err = LocalBinaryBackend::new(&compiler)
            .compile("var a;", &simple(), Some(&ws))
            .unwrap_err();

        assert!(matches!(err, MinifyError::BackendExecution { .. }));
        assert!(err.diagnostic().unwrap().contains("blank"));
        assert!(!ws.output_path().exists());
    }

    #[test]
    fn test_requires_workspace() {
        let err = LocalBinaryBackend::new("closure-compiler")
            .compile("var a;", &simple(), None)
            .unwrap_err();

        assert!(err.diagnostic().unwrap().contains("work directory"));
    }

    #[test]
    fn test_missing_executable_is_backend_failure() {
        let tmp = TempDir::new().unwrap();
        let ws = TempWorkspace::new(tmp.path(), false);

        let err = LocalBinaryBackend::new(tmp.path().join("nope"))
            .compile("var a;", &simple(), Some(&ws))
            .unwrap_err();

        assert!(matches!(err, MinifyError::BackendExecution { .. }));
    }
}
