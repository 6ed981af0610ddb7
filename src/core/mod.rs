//! Core pipeline data: configuration, sources, preprocessing, errors.

pub mod configuration;
pub mod error;
pub mod preprocess;
pub mod source;

pub use configuration::{BackendPreference, BuildConfiguration, LanguageLevel};
pub use error::{MinifyError, Result};
pub use preprocess::{MalformedBlock, MarkerKind, Preprocessor};
pub use source::{aggregate, AggregatedSource};
