//! Per-build configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{MinifyError, Result};
use crate::core::preprocess::check_label;

/// ECMAScript dialect accepted or emitted by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LanguageLevel {
    #[serde(rename = "ES3")]
    Es3,
    #[default]
    #[serde(rename = "ES5")]
    Es5,
    #[serde(rename = "ES6")]
    Es6,
}

impl LanguageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageLevel::Es3 => "ES3",
            LanguageLevel::Es5 => "ES5",
            LanguageLevel::Es6 => "ES6",
        }
    }

    /// Compiler flag value, e.g. `ECMASCRIPT5_STRICT`.
    ///
    /// ES3 has no strict dialect, so `strict` is ignored for it.
    pub fn compiler_name(&self, strict: bool) -> &'static str {
        match (self, strict) {
            (LanguageLevel::Es3, _) => "ECMASCRIPT3",
            (LanguageLevel::Es5, false) => "ECMASCRIPT5",
            (LanguageLevel::Es5, true) => "ECMASCRIPT5_STRICT",
            (LanguageLevel::Es6, false) => "ECMASCRIPT6",
            (LanguageLevel::Es6, true) => "ECMASCRIPT6_STRICT",
        }
    }
}

impl fmt::Display for LanguageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "es3" | "ecmascript3" => Ok(LanguageLevel::Es3),
            "es5" | "ecmascript5" => Ok(LanguageLevel::Es5),
            "es6" | "ecmascript6" | "es2015" => Ok(LanguageLevel::Es6),
            _ => Err(format!(
                "invalid language level '{}'; expected 'ES3', 'ES5', or 'ES6'",
                s
            )),
        }
    }
}

/// Which backend the pipeline should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendPreference {
    /// Probe for the installed compiler, fall back to the bundled one.
    #[default]
    Auto,
    /// Always run the installed `closure-compiler` executable.
    ForceLocalBinary,
    /// Always run the bundled compiler archive.
    ForceBundledLibrary,
    /// Send the source to the compilation web service.
    Remote,
}

impl BackendPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendPreference::Auto => "auto",
            BackendPreference::ForceLocalBinary => "force-local-binary",
            BackendPreference::ForceBundledLibrary => "force-bundled-library",
            BackendPreference::Remote => "remote",
        }
    }
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendPreference {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendPreference::Auto),
            "force-local-binary" | "local-binary" | "binary" | "brew" => {
                Ok(BackendPreference::ForceLocalBinary)
            }
            "force-bundled-library" | "bundled-library" | "bundled" | "library" => {
                Ok(BackendPreference::ForceBundledLibrary)
            }
            "remote" | "online" => Ok(BackendPreference::Remote),
            _ => Err(format!(
                "invalid backend '{}'; expected 'auto', 'local-binary', 'bundled', or 'remote'",
                s
            )),
        }
    }
}

/// Options for a single build invocation.
///
/// Constructed once, then only read by the pipeline.
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    /// Raw text prepended to the aggregated sources
    pub header: String,
    /// Raw text appended to the aggregated sources
    pub footer: String,
    /// Conditional-compilation labels whose blocks are stripped
    pub labels: Vec<String>,
    /// Wrap the output in a self-invoking closure
    pub wrap: bool,
    pub strict: bool,
    pub pretty: bool,
    pub language_in: Option<LanguageLevel>,
    pub language_out: Option<LanguageLevel>,
    /// Extern declaration files, only used with advanced optimization
    pub externs: Vec<PathBuf>,
    /// Raw compiler options, e.g. `"jscomp_off checkVars"`
    pub extra_directives: Vec<String>,
    /// When false, only concatenate and preprocess
    pub compile: bool,
    pub advanced_optimization: bool,
    pub backend_preference: BackendPreference,
    /// Directory holding the temporary pre/post compilation files
    pub work_directory: PathBuf,
    pub keep_temp_files: bool,
    pub verbose: bool,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        BuildConfiguration {
            header: String::new(),
            footer: String::new(),
            labels: Vec::new(),
            wrap: true,
            strict: false,
            pretty: false,
            language_in: None,
            language_out: None,
            externs: Vec::new(),
            extra_directives: Vec::new(),
            compile: true,
            advanced_optimization: false,
            backend_preference: BackendPreference::Auto,
            work_directory: PathBuf::from("."),
            keep_temp_files: false,
            verbose: false,
        }
    }
}

impl BuildConfiguration {
    /// Configuration that only concatenates and preprocesses.
    pub fn concat_only() -> Self {
        BuildConfiguration {
            compile: false,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_externs<I, P>(mut self, externs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.externs = externs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extra_directives<I, S>(mut self, directives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_directives = directives.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_advanced(mut self, advanced: bool) -> Self {
        self.advanced_optimization = advanced;
        self
    }

    pub fn with_compile(mut self, compile: bool) -> Self {
        self.compile = compile;
        self
    }

    pub fn with_backend(mut self, preference: BackendPreference) -> Self {
        self.backend_preference = preference;
        self
    }

    pub fn with_work_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_directory = dir.into();
        self
    }

    pub fn with_keep_temp_files(mut self, keep: bool) -> Self {
        self.keep_temp_files = keep;
        self
    }

    /// Check option combinations before the build touches any file.
    ///
    /// Only metadata lookups happen here: extern files must exist when an
    /// advanced compile is requested, and the work directory must exist when
    /// a local backend may stage files in it.
    pub fn validate(&self) -> Result<()> {
        for label in &self.labels {
            check_label(label)?;
        }

        if self.extra_directives.iter().any(|d| d.trim().is_empty()) {
            return Err(MinifyError::invalid("empty compiler option"));
        }

        if !self.compile {
            return Ok(());
        }

        if self.advanced_optimization {
            for extern_file in &self.externs {
                if !extern_file.is_file() {
                    return Err(MinifyError::invalid(format!(
                        "extern file not found: {}",
                        extern_file.display()
                    )));
                }
            }
        } else if !self.externs.is_empty() {
            tracing::warn!(
                "{} extern file(s) ignored without advanced optimization",
                self.externs.len()
            );
        }

        if self.backend_preference != BackendPreference::Remote
            && !is_directory(&self.work_directory)
        {
            return Err(MinifyError::invalid(format!(
                "work directory does not exist: {}",
                self.work_directory.display()
            )));
        }

        Ok(())
    }
}

fn is_directory(path: &Path) -> bool {
    // An empty path means the current directory.
    path.as_os_str().is_empty() || path.is_dir()
}
