//! Compilation stage.
//!
//! Turns preprocessed source into compiled output: directive assembly,
//! backend selection and the temp-file handoff used by local compilers.

pub mod backend;
pub mod directives;
pub mod workspace;

pub use backend::{
    select_backend, BackendKind, CompilationBackend, LocalBinaryBackend, LocalLibraryBackend,
    RemoteServiceBackend,
};
pub use directives::{assemble, Directive, OptimizationLevel, OUTPUT_WRAPPER};
pub use workspace::TempWorkspace;
