//! Compilation backends.
//!
//! Three ways to run the compiler:
//! - [`LocalBinaryBackend`]: the installed `closure-compiler` executable
//! - [`LocalLibraryBackend`]: the bundled compiler archive, run through Java
//! - [`RemoteServiceBackend`]: the Closure Compiler web service
//!
//! With [`BackendPreference::Auto`] the installed executable is probed first
//! and the bundled archive is used when it is absent.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::builder::directives::Directive;
use crate::builder::workspace::TempWorkspace;
use crate::core::configuration::BackendPreference;
use crate::core::error::Result;
use crate::util::config::ToolchainSettings;

mod local_binary;
mod local_library;
mod remote;

pub use local_binary::LocalBinaryBackend;
pub use local_library::LocalLibraryBackend;
pub use remote::{RemoteServiceBackend, ServiceResponse};

/// Identifies a backend implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    LocalBinary,
    LocalLibrary,
    RemoteService,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::LocalBinary => "local-binary",
            BackendKind::LocalLibrary => "bundled-library",
            BackendKind::RemoteService => "remote-service",
        }
    }

    /// Whether the backend hands source and output through temp files.
    pub fn uses_workspace(&self) -> bool {
        !matches!(self, BackendKind::RemoteService)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A way of turning preprocessed source into compiled output.
///
/// Called at most once per build and never retried.
pub trait CompilationBackend {
    fn kind(&self) -> BackendKind;

    /// Compile `source` with `directives`.
    ///
    /// Backends whose kind [uses a workspace](BackendKind::uses_workspace)
    /// receive one and stage the source through it; the caller owns it and
    /// cleans it up after this returns. Others receive `None`.
    fn compile(
        &self,
        source: &str,
        directives: &[Directive],
        workspace: Option<&TempWorkspace>,
    ) -> Result<String>;
}

/// Outcome of looking for the installed compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryProbe {
    Found(PathBuf),
    NotFound,
    /// The lookup itself went wrong
    Failed(String),
}

/// Look for the installed compiler executable.
///
/// A configured path is checked directly; a bare name is searched on PATH.
pub fn probe_local_binary(settings: &ToolchainSettings) -> BinaryProbe {
    let binary = settings.compiler_binary();

    if binary.components().count() > 1 || binary.is_absolute() {
        return if binary.is_file() {
            BinaryProbe::Found(binary)
        } else {
            BinaryProbe::NotFound
        };
    }

    match which::which(&binary) {
        Ok(path) => BinaryProbe::Found(path),
        Err(which::Error::CannotFindBinaryPath) => BinaryProbe::NotFound,
        Err(e) => BinaryProbe::Failed(e.to_string()),
    }
}

/// Backend kind chosen for a preference and a probe outcome.
pub fn kind_for(preference: BackendPreference, probe: &BinaryProbe) -> BackendKind {
    match preference {
        BackendPreference::Auto => match probe {
            BinaryProbe::Found(_) => BackendKind::LocalBinary,
            BinaryProbe::NotFound | BinaryProbe::Failed(_) => BackendKind::LocalLibrary,
        },
        BackendPreference::ForceLocalBinary => BackendKind::LocalBinary,
        BackendPreference::ForceBundledLibrary => BackendKind::LocalLibrary,
        BackendPreference::Remote => BackendKind::RemoteService,
    }
}

/// Create the backend for `preference`.
///
/// Only [`BackendPreference::Auto`] probes, and the probe finishes before
/// anything is written. A failed probe falls back to the bundled compiler.
pub fn select_backend(
    preference: BackendPreference,
    settings: &ToolchainSettings,
) -> Result<Box<dyn CompilationBackend>> {
    let probe = if preference == BackendPreference::Auto {
        let probe = probe_local_binary(settings);
        match &probe {
            BinaryProbe::Found(path) => {
                tracing::debug!("found compiler at {}", path.display())
            }
            BinaryProbe::NotFound => tracing::debug!(
                "{} not found, using bundled compiler",
                settings.compiler_binary().display()
            ),
            BinaryProbe::Failed(reason) => tracing::warn!(
                "could not probe for {}: {}; using bundled compiler",
                settings.compiler_binary().display(),
                reason
            ),
        }
        probe
    } else {
        BinaryProbe::NotFound
    };

    let backend: Box<dyn CompilationBackend> = match kind_for(preference, &probe) {
        BackendKind::LocalBinary => {
            let program = match probe {
                BinaryProbe::Found(path) => path,
                _ => settings.compiler_binary(),
            };
            Box::new(LocalBinaryBackend::new(program))
        }
        BackendKind::LocalLibrary => Box::new(LocalLibraryBackend::from_settings(settings)),
        BackendKind::RemoteService => Box::new(RemoteServiceBackend::new(settings.endpoint())?),
    };

    Ok(backend)
}

/// Args shared by both command-line backends: directives, then the files.
pub(crate) fn compiler_args(directives: &[Directive], workspace: &TempWorkspace) -> Vec<String> {
    let mut args = crate::builder::directives::to_command_args(directives);
    args.push("--js_output_file".to_string());
    args.push(path_arg(workspace.output_path()));
    args.push("--js".to_string());
    args.push(path_arg(workspace.source_path()));
    args
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}
