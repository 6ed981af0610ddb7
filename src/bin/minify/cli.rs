//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

/// Minify - Concatenate, preprocess and compile JavaScript with Closure Compiler
#[derive(Parser, Debug)]
#[command(name = "minify")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("backend").args(["brew", "bundled", "remote"])))]
#[command(group(ArgGroup::new("language_in").args(["es3in", "es5in", "es6in"])))]
#[command(group(ArgGroup::new("language_out").args(["es5out", "es6out"])))]
pub struct Cli {
    /// Labels whose blocks are stripped, e.g. `@dev` (adds to dev, debug, assert)
    #[arg(value_name = "@LABEL")]
    pub labels: Vec<String>,

    /// Add a label to strip
    #[arg(long = "label", value_name = "LABEL")]
    pub extra_labels: Vec<String>,

    /// Add a source file (after those listed in package.json)
    #[arg(long = "source", value_name = "FILE")]
    pub sources: Vec<PathBuf>,

    /// Output file (defaults to package.json's build output)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// File whose contents are placed before the sources
    #[arg(long, value_name = "FILE")]
    pub header: Option<PathBuf>,

    /// File whose contents are placed after the sources
    #[arg(long, value_name = "FILE")]
    pub footer: Option<PathBuf>,

    /// Extern declarations for advanced optimization
    #[arg(long = "extern", visible_alias = "externs", value_name = "FILE")]
    pub externs: Vec<PathBuf>,

    /// Raw compiler option, e.g. "jscomp_off checkVars"
    #[arg(long = "option", value_name = "OPTION")]
    pub options: Vec<String>,

    /// Do not wrap the output in a closure
    #[arg(long)]
    pub nowrap: bool,

    /// Only concatenate and preprocess
    #[arg(long)]
    pub nocompile: bool,

    /// Use simple instead of advanced optimizations
    #[arg(long)]
    pub simple: bool,

    /// Compile as strict mode code
    #[arg(long)]
    pub strict: bool,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,

    /// Keep the pre-compilation temp file
    #[arg(long)]
    pub keep: bool,

    /// Input is ES3
    #[arg(long)]
    pub es3in: bool,

    /// Input is ES5
    #[arg(long)]
    pub es5in: bool,

    /// Input is ES6
    #[arg(long)]
    pub es6in: bool,

    /// Emit ES5
    #[arg(long)]
    pub es5out: bool,

    /// Emit ES6
    #[arg(long)]
    pub es6out: bool,

    /// Use the installed closure-compiler executable
    #[arg(long)]
    pub brew: bool,

    /// Use the bundled compiler archive
    #[arg(long)]
    pub bundled: bool,

    /// Use the Closure Compiler web service
    #[arg(long)]
    pub remote: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
