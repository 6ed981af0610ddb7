//! Build defaults from a project's `package.json`.
//!
//! ```json
//! {
//!   "name": "app",
//!   "x-build": {
//!     "source": ["lib/a.js", "lib/b.js"],
//!     "output": "release/app.min.js"
//!   }
//! }
//! ```
//!
//! `x-build` wins over `build`; `files` is accepted in place of `source`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// The `build` section of a `package.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageBuild {
    #[serde(default)]
    pub source: Vec<PathBuf>,
    #[serde(default)]
    pub files: Vec<PathBuf>,
    pub output: Option<PathBuf>,
}

impl PackageBuild {
    /// Source list, preferring `source` over `files`.
    pub fn sources(&self) -> &[PathBuf] {
        if self.source.is_empty() {
            &self.files
        } else {
            &self.source
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    #[serde(rename = "x-build")]
    x_build: Option<PackageBuild>,
    build: Option<PackageBuild>,
}

/// Parse the build section out of `package.json` text.
pub fn parse(contents: &str) -> Result<PackageBuild> {
    let json: PackageJson = serde_json::from_str(contents)?;
    Ok(json.x_build.or(json.build).unwrap_or_default())
}

/// Read `dir/package.json`, or defaults when there is none.
pub fn load(dir: &Path) -> Result<PackageBuild> {
    let path = dir.join("package.json");
    if !path.is_file() {
        return Ok(PackageBuild::default());
    }

    let contents = crate::util::fs::read_to_string(&path)?;
    parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_x_build_wins() {
        let build = parse(
            r#"{
                "name": "app",
                "x-build": { "source": ["a.js"], "output": "release/app.min.js" },
                "build": { "source": ["b.js"], "output": "b.min.js" }
            }"#,
        )
        .unwrap();

        assert_eq!(build.sources(), [PathBuf::from("a.js")]);
        assert_eq!(build.output, Some(PathBuf::from("release/app.min.js")));
    }

    #[test]
    fn test_build_files_fallback() {
        let build = parse(r#"{ "build": { "files": ["lib/x.js", "lib/y.js"] } }"#).unwrap();

        assert_eq!(
            build.sources(),
            [PathBuf::from("lib/x.js"), PathBuf::from("lib/y.js")]
        );
        assert_eq!(build.output, None);
    }

    #[test]
    fn test_no_build_section() {
        let build = parse(r#"{ "name": "plain", "version": "1.0.0" }"#).unwrap();
        assert_eq!(build, PackageBuild::default());
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load(tmp.path()).unwrap(), PackageBuild::default());
    }

    #[test]
    fn test_load_broken_file() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("package.json"), "{ not json").unwrap();

        let err = load(tmp.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("package.json"));
    }
}
