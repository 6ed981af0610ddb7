//! Configuration file support for minify.
//!
//! Two locations are read:
//! - Global: `~/.minify/config.toml` - user-wide compiler locations
//! - Project: `.minify/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::configuration::BackendPreference;

/// Name of the installed compiler executable.
pub const DEFAULT_COMPILER_BINARY: &str = "closure-compiler";

/// Java launcher used for the bundled compiler archive.
pub const DEFAULT_JAVA: &str = "java";

/// Closure Compiler Service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://closure-compiler.appspot.com/compile";

/// minify configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to find the compilers
    pub toolchain: ToolchainSettings,

    /// Build defaults
    pub build: BuildDefaults,
}

/// Compiler locations for each backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Installed compiler executable (name on PATH or absolute path)
    pub closure_compiler: Option<PathBuf>,

    /// Java launcher for the bundled compiler
    pub java: Option<PathBuf>,

    /// Bundled compiler archive
    pub compiler_jar: Option<PathBuf>,

    /// Compilation service URL
    pub endpoint: Option<String>,
}

impl ToolchainSettings {
    pub fn compiler_binary(&self) -> PathBuf {
        self.closure_compiler
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPILER_BINARY))
    }

    pub fn java(&self) -> PathBuf {
        self.java.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_JAVA))
    }

    /// Configured archive, else `~/.minify/lib/compiler.jar`.
    pub fn compiler_jar(&self) -> Option<PathBuf> {
        self.compiler_jar
            .clone()
            .or_else(|| global_config_dir().map(|dir| dir.join("lib").join("compiler.jar")))
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Merge another settings block into this one (other takes precedence).
    pub fn merge(&mut self, other: ToolchainSettings) {
        if other.closure_compiler.is_some() {
            self.closure_compiler = other.closure_compiler;
        }
        if other.java.is_some() {
            self.java = other.java;
        }
        if other.compiler_jar.is_some() {
            self.compiler_jar = other.compiler_jar;
        }
        if other.endpoint.is_some() {
            self.endpoint = other.endpoint;
        }
    }
}

/// Build defaults applied when the command line is silent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildDefaults {
    /// Default backend (auto, local-binary, bundled, remote)
    pub backend: Option<String>,

    /// Use advanced optimizations by default
    pub advanced: Option<bool>,

    /// Default labels to strip
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Config {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Like [`load`](Self::load), but a missing or broken file yields defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Overlay `other` on top of this config.
    pub fn merge(&mut self, other: Config) {
        self.toolchain.merge(other.toolchain);

        if other.build.backend.is_some() {
            self.build.backend = other.build.backend;
        }
        if other.build.advanced.is_some() {
            self.build.advanced = other.build.advanced;
        }
        if !other.build.labels.is_empty() {
            self.build.labels = other.build.labels;
        }
    }

    /// Backend preference from `[build] backend`, ignoring unknown names.
    pub fn backend(&self) -> Option<BackendPreference> {
        let raw = self.build.backend.as_ref()?;
        match raw.parse() {
            Ok(backend) => Some(backend),
            Err(e) => {
                tracing::warn!("ignoring configured backend: {}", e);
                None
            }
        }
    }
}

/// Read the global and project config files and merge them.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.minify/config.toml)
/// 2. Global config (~/.minify/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global minify config directory (~/.minify).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".minify"))
}

/// Get the global config path (~/.minify/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.minify/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".minify").join("config.toml")
}
