//! Compiler directive assembly.
//!
//! [`assemble`] turns a [`BuildConfiguration`] into an ordered list of
//! backend-neutral directives. The order is fixed:
//!
//! 1. compilation level, then externs (advanced only)
//! 2. output wrapper
//! 3. language in/out
//! 4. formatting
//! 5. passthrough options
//!
//! Backends translate the list into their own invocation shape.

use std::fmt;
use std::path::PathBuf;

use crate::core::configuration::{BuildConfiguration, LanguageLevel};

/// Self-invoking wrapper placed around the compiled output.
pub const OUTPUT_WRAPPER: &str = "(function(global){\n%output%\n})((this||0).self||global);";

/// Optimization level passed to the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationLevel {
    Simple,
    Advanced,
}

impl OptimizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationLevel::Simple => "SIMPLE_OPTIMIZATIONS",
            OptimizationLevel::Advanced => "ADVANCED_OPTIMIZATIONS",
        }
    }
}

/// One compiler option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    CompilationLevel(OptimizationLevel),
    Externs(PathBuf),
    OutputWrapper(String),
    LanguageIn(String),
    LanguageOut(String),
    Formatting(String),
    /// A raw `name [value]` option supplied by the caller
    Passthrough(String),
}

impl Directive {
    /// Option name without the leading dashes.
    pub fn name(&self) -> &str {
        match self {
            Directive::CompilationLevel(_) => "compilation_level",
            Directive::Externs(_) => "externs",
            Directive::OutputWrapper(_) => "output_wrapper",
            Directive::LanguageIn(_) => "language_in",
            Directive::LanguageOut(_) => "language_out",
            Directive::Formatting(_) => "formatting",
            Directive::Passthrough(raw) => split_raw(raw).0,
        }
    }

    /// Option value, if the option takes one.
    pub fn value(&self) -> Option<String> {
        match self {
            Directive::CompilationLevel(level) => Some(level.as_str().to_string()),
            Directive::Externs(path) => Some(path.display().to_string()),
            Directive::OutputWrapper(template) => Some(template.clone()),
            Directive::LanguageIn(lang) | Directive::LanguageOut(lang) => Some(lang.clone()),
            Directive::Formatting(style) => Some(style.clone()),
            Directive::Passthrough(raw) => split_raw(raw).1.map(str::to_string),
        }
    }

    /// Command-line form: `["--name", "value"]` or `["--name"]`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![format!("--{}", self.name())];
        if let Some(value) = self.value() {
            args.push(value);
        }
        args
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}", self.name())?;
        if let Some(value) = self.value() {
            write!(f, " {}", value)?;
        }
        Ok(())
    }
}

/// Split `"--name value"` into `("name", Some("value"))`.
fn split_raw(raw: &str) -> (&str, Option<&str>) {
    let raw = raw.trim().trim_start_matches("--");
    match raw.split_once(char::is_whitespace) {
        Some((name, value)) => {
            let value = value.trim();
            (name, (!value.is_empty()).then_some(value))
        }
        None => (raw, None),
    }
}

/// Map a configuration to its ordered directive list.
pub fn assemble(config: &BuildConfiguration) -> Vec<Directive> {
    let mut directives = Vec::new();

    if config.advanced_optimization {
        directives.push(Directive::CompilationLevel(OptimizationLevel::Advanced));
        directives.extend(config.externs.iter().cloned().map(Directive::Externs));
    } else {
        directives.push(Directive::CompilationLevel(OptimizationLevel::Simple));
    }

    if config.wrap {
        directives.push(Directive::OutputWrapper(OUTPUT_WRAPPER.to_string()));
    }

    if config.strict || config.language_in.is_some() {
        let level = config.language_in.unwrap_or(LanguageLevel::Es5);
        directives.push(Directive::LanguageIn(
            level.compiler_name(config.strict).to_string(),
        ));
    }
    if let Some(level) = config.language_out {
        directives.push(Directive::LanguageOut(level.compiler_name(false).to_string()));
    }

    if config.pretty {
        directives.push(Directive::Formatting("pretty_print".to_string()));
    }

    directives.extend(
        config
            .extra_directives
            .iter()
            .cloned()
            .map(Directive::Passthrough),
    );

    directives
}

/// Flatten directives into command-line arguments.
pub fn to_command_args(directives: &[Directive]) -> Vec<String> {
    directives.iter().flat_map(Directive::to_args).collect()
}
