//! Minify - A JavaScript bundler front end for the Closure Compiler
//!
//! This crate concatenates source files, strips conditional-compilation
//! blocks, and hands the result to a local or remote Closure Compiler.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for minify unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides fake compiler executables and a stand-in compilation service.
#[cfg(test)]
pub mod test_support;

pub use crate::builder::backend::{BackendKind, CompilationBackend};
pub use crate::core::{
    configuration::{BackendPreference, BuildConfiguration, LanguageLevel},
    error::{MinifyError, Result},
    preprocess::Preprocessor,
};
pub use crate::ops::{BuildOutput, Minifier};
pub use crate::util::config::ToolchainSettings;
