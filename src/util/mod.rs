//! Shared utilities

pub mod config;
pub mod fs;
pub mod package_json;
pub mod process;

pub use config::Config;
pub use package_json::PackageBuild;
pub use process::ProcessBuilder;
