//! The build pipeline.
//!
//! A build runs these stages in order:
//!
//! ```text
//!              Aggregating -> Preprocessing -> Skipped   -> Finalizing
//! Selecting -> Aggregating -> Preprocessing -> Compiling -> Finalizing
//! ```
//!
//! Configuration is validated, and the backend chosen, before any source is
//! read: a bad endpoint or label is reported ahead of any I/O error. When
//! `compile` is off no backend is chosen and the work directory is never
//! touched. Temp files exist only for backends that stage through the work
//! directory, and a scoped guard releases them on every exit path.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::builder::backend::{select_backend, BackendKind, CompilationBackend};
use crate::builder::directives::{assemble, Directive};
use crate::builder::workspace::TempWorkspace;
use crate::core::configuration::BuildConfiguration;
use crate::core::error::{MinifyError, Result};
use crate::core::preprocess::{MalformedBlock, Preprocessor};
use crate::core::source::aggregate;
use crate::util::config::ToolchainSettings;

/// Pipeline stage, reported in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Aggregating,
    Preprocessing,
    Skipped,
    Selecting,
    Compiling,
    Finalizing,
}

impl BuildStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStage::Aggregating => "aggregating",
            BuildStage::Preprocessing => "preprocessing",
            BuildStage::Skipped => "skipped",
            BuildStage::Selecting => "selecting",
            BuildStage::Compiling => "compiling",
            BuildStage::Finalizing => "finalizing",
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Final code
    pub code: String,
    /// Sources that did not exist and contributed nothing
    pub missing: Vec<PathBuf>,
    /// Backend that compiled the code, `None` when compilation was skipped
    pub backend: Option<BackendKind>,
    /// Block markers left in place by preprocessing
    pub malformed: Vec<MalformedBlock>,
}

/// Entry point for building bundles.
///
/// Holds the toolchain settings used to locate compilers; every build gets
/// its own [`BuildConfiguration`]. Builds share no state, so one `Minifier`
/// can serve any number of builds as long as they use distinct work
/// directories.
#[derive(Debug, Clone, Default)]
pub struct Minifier {
    toolchain: ToolchainSettings,
}

impl Minifier {
    pub fn new(toolchain: ToolchainSettings) -> Self {
        Minifier { toolchain }
    }

    pub fn toolchain(&self) -> &ToolchainSettings {
        &self.toolchain
    }

    /// Aggregate, preprocess and compile `sources`.
    pub fn build<P: AsRef<Path>>(
        &self,
        sources: &[P],
        config: &BuildConfiguration,
    ) -> Result<BuildOutput> {
        self.run(sources, config, |config| {
            select_backend(config.backend_preference, &self.toolchain)
        })
    }

    /// Like [`build`](Self::build), handing the result to `on_complete`.
    ///
    /// The callback runs exactly once, on the calling thread, after cleanup.
    pub fn build_with<P, F>(&self, sources: &[P], config: &BuildConfiguration, on_complete: F)
    where
        P: AsRef<Path>,
        F: FnOnce(Result<BuildOutput>),
    {
        on_complete(self.build(sources, config));
    }

    /// Build and write the code to `output`, creating parent directories.
    ///
    /// Nothing is written when the build fails.
    pub fn build_to_file<P: AsRef<Path>>(
        &self,
        sources: &[P],
        config: &BuildConfiguration,
        output: &Path,
    ) -> Result<BuildOutput> {
        let built = self.build(sources, config)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MinifyError::io(parent, e))?;
        }
        std::fs::write(output, &built.code).map_err(|e| MinifyError::io(output, e))?;

        tracing::debug!("wrote {} bytes to {}", built.code.len(), output.display());
        Ok(built)
    }

    /// Build with an already constructed backend instead of selecting one.
    pub fn build_with_backend<P: AsRef<Path>>(
        &self,
        sources: &[P],
        config: &BuildConfiguration,
        backend: &dyn CompilationBackend,
    ) -> Result<BuildOutput> {
        let borrowed: Box<dyn CompilationBackend + '_> = Box::new(Borrowed(backend));
        self.run(sources, config, move |_| Ok(borrowed))
    }

    fn run<'b, P, S>(
        &self,
        sources: &[P],
        config: &BuildConfiguration,
        select: S,
    ) -> Result<BuildOutput>
    where
        P: AsRef<Path>,
        S: FnOnce(&BuildConfiguration) -> Result<Box<dyn CompilationBackend + 'b>>,
    {
        config.validate()?;
        let preprocessor = Preprocessor::new(&config.labels)?;
        let directives = assemble(config);

        let backend = if config.compile {
            enter(BuildStage::Selecting);
            Some(select(config)?)
        } else {
            None
        };

        enter(BuildStage::Aggregating);
        let aggregated = aggregate(sources)?;

        let mut text =
            String::with_capacity(config.header.len() + aggregated.text.len() + config.footer.len());
        text.push_str(&config.header);
        text.push_str(&aggregated.text);
        text.push_str(&config.footer);

        let mut malformed = Vec::new();
        if !config.labels.is_empty() {
            enter(BuildStage::Preprocessing);
            (text, malformed) = preprocessor.process_with_report(&text);
            for block in &malformed {
                tracing::warn!("malformed block left in place, {}", block);
            }
        }

        let Some(backend) = backend else {
            enter(BuildStage::Skipped);
            enter(BuildStage::Finalizing);
            return Ok(BuildOutput {
                code: text,
                missing: aggregated.missing,
                backend: None,
                malformed,
            });
        };

        let kind = backend.kind();
        log_invocation(config, kind, &directives);

        enter(BuildStage::Compiling);
        let code = {
            let workspace = kind
                .uses_workspace()
                .then(|| TempWorkspace::new(&config.work_directory, config.keep_temp_files));
            let compiled = backend.compile(&text, &directives, workspace.as_ref());
            enter(BuildStage::Finalizing);
            compiled
        }?;

        Ok(BuildOutput {
            code,
            missing: aggregated.missing,
            backend: Some(kind),
            malformed,
        })
    }
}

fn enter(stage: BuildStage) {
    tracing::debug!("build stage: {}", stage);
}

fn log_invocation(config: &BuildConfiguration, kind: BackendKind, directives: &[Directive]) {
    let rendered = directives
        .iter()
        .map(Directive::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    if config.verbose {
        tracing::info!("compiling with {}: {}", kind, rendered);
    } else {
        tracing::debug!("compiling with {}: {}", kind, rendered);
    }
}

/// Lends a caller-owned backend to the pipeline.
struct Borrowed<'a>(&'a dyn CompilationBackend);

impl CompilationBackend for Borrowed<'_> {
    fn kind(&self) -> BackendKind {
        self.0.kind()
    }

    fn compile(
        &self,
        source: &str,
        directives: &[Directive],
        workspace: Option<&TempWorkspace>,
    ) -> Result<String> {
        self.0.compile(source, directives, workspace)
    }
}
