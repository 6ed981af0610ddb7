//! High-level operations.
//!
//! This module contains the build pipeline driven by the `minify` binary.

pub mod minify;

pub use minify::{BuildOutput, BuildStage, Minifier};
