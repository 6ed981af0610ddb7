//! The `minify` build command

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::Cli;
use minify::core::configuration::{BackendPreference, BuildConfiguration, LanguageLevel};
use minify::ops::Minifier;
use minify::util::config::{global_config_path, load_config, project_config_path, Config};
use minify::util::{fs, package_json};

/// Labels stripped by every build unless configured otherwise.
pub const DEFAULT_LABELS: [&str; 3] = ["dev", "debug", "assert"];

/// Everything the command resolved from flags, config and package.json.
#[derive(Debug)]
pub struct Invocation {
    pub sources: Vec<PathBuf>,
    pub output: PathBuf,
    pub config: BuildConfiguration,
}

pub fn execute(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    // Load configuration (global + project)
    let global = global_config_path().unwrap_or_default();
    let config = load_config(&global, &project_config_path(&cwd));

    let invocation = resolve(&cli, &config, &cwd)?;

    let missing: Vec<_> = fs::missing_files(&invocation.config.externs)
        .into_iter()
        .chain(fs::missing_files(&invocation.sources))
        .collect();
    if !missing.is_empty() {
        let list = missing
            .iter()
            .map(|p| format!("  {}", p.display()))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("file not found:\n{}", list);
    }

    if invocation.config.compile {
        fs::ensure_dir(&invocation.config.work_directory)?;
    }

    let spinner = (invocation.config.compile && !cli.verbose).then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Compiling {}", invocation.output.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let minifier = Minifier::new(config.toolchain.clone());
    let result = minifier.build_to_file(&invocation.sources, &invocation.config, &invocation.output);

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let built = result?;

    let via = built
        .backend
        .map(|kind| format!(" ({})", kind))
        .unwrap_or_default();
    eprintln!(
        "    Finished {} bytes -> {}{}",
        built.code.len(),
        invocation.output.display(),
        via
    );

    Ok(())
}

/// Combine command-line flags with config and `package.json` defaults.
///
/// Command-line values come after (and never duplicate) the defaults.
pub fn resolve(cli: &Cli, config: &Config, project_dir: &Path) -> Result<Invocation> {
    let package = package_json::load(project_dir)?;

    let mut labels: Vec<String> = if config.build.labels.is_empty() {
        DEFAULT_LABELS.iter().map(|l| l.to_string()).collect()
    } else {
        config.build.labels.clone()
    };
    for raw in &cli.labels {
        let Some(label) = raw.strip_prefix('@') else {
            bail!("unexpected argument `{}`; labels are written as `@label`", raw);
        };
        push_unique(&mut labels, label.to_string());
    }
    for raw in &cli.extra_labels {
        push_unique(&mut labels, raw.trim_start_matches('@').to_string());
    }

    let mut sources = Vec::new();
    for source in package.sources().iter().chain(&cli.sources) {
        push_unique(&mut sources, source.clone());
    }
    if sources.is_empty() {
        bail!("no input sources; pass --source or set `x-build.source` in package.json");
    }

    let Some(output) = cli.output.clone().or(package.output) else {
        bail!("no output file; pass --output or set `x-build.output` in package.json");
    };

    let mut externs = Vec::new();
    for extern_file in &cli.externs {
        push_unique(&mut externs, extern_file.clone());
    }
    let mut options = Vec::new();
    for option in &cli.options {
        push_unique(&mut options, option.clone());
    }

    let header = cli
        .header
        .as_deref()
        .map(fs::read_to_string)
        .transpose()?
        .unwrap_or_default();
    let footer = cli
        .footer
        .as_deref()
        .map(fs::read_to_string)
        .transpose()?
        .unwrap_or_default();

    let backend_preference = if cli.brew {
        BackendPreference::ForceLocalBinary
    } else if cli.bundled {
        BackendPreference::ForceBundledLibrary
    } else if cli.remote {
        BackendPreference::Remote
    } else {
        config.backend().unwrap_or_default()
    };

    let language_in = if cli.es3in {
        Some(LanguageLevel::Es3)
    } else if cli.es5in {
        Some(LanguageLevel::Es5)
    } else if cli.es6in {
        Some(LanguageLevel::Es6)
    } else {
        None
    };
    let language_out = if cli.es5out {
        Some(LanguageLevel::Es5)
    } else if cli.es6out {
        Some(LanguageLevel::Es6)
    } else {
        None
    };

    let advanced = !cli.simple && config.build.advanced.unwrap_or(true);

    let build = BuildConfiguration {
        header,
        footer,
        labels,
        wrap: !cli.nowrap,
        strict: cli.strict,
        pretty: cli.pretty,
        language_in,
        language_out,
        externs,
        extra_directives: options,
        compile: !cli.nocompile,
        advanced_optimization: advanced,
        backend_preference,
        work_directory: fs::parent_or_current(&output),
        keep_temp_files: cli.keep,
        verbose: cli.verbose,
    };

    Ok(Invocation {
        sources,
        output,
        config: build,
    })
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("minify").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let tmp = TempDir::new().unwrap();
        let cli = parse(&["--source", "a.js", "--output", "release/a.min.js"]);

        let inv = resolve(&cli, &Config::default(), tmp.path()).unwrap();

        assert_eq!(inv.config.labels, ["dev", "debug", "assert"]);
        assert!(inv.config.compile);
        assert!(inv.config.advanced_optimization);
        assert!(inv.config.wrap);
        assert_eq!(inv.config.backend_preference, BackendPreference::Auto);
        assert_eq!(inv.config.work_directory, PathBuf::from("release"));
    }

    #[test]
    fn test_duplicates_ignored() {
        let tmp = TempDir::new().unwrap();
        let cli = parse(&[
            "@dev", "@trace", "--label", "@trace", "--source", "a.js", "--source", "a.js",
            "--extern", "x.js", "--extern", "x.js", "--output", "out.js",
        ]);

        let inv = resolve(&cli, &Config::default(), tmp.path()).unwrap();

        assert_eq!(inv.config.labels, ["dev", "debug", "assert", "trace"]);
        assert_eq!(inv.sources, [PathBuf::from("a.js")]);
        assert_eq!(inv.config.externs, [PathBuf::from("x.js")]);
        assert_eq!(inv.config.work_directory, PathBuf::from("."));
    }

    #[test]
    fn test_package_json_supplies_sources_and_output() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("package.json"),
            r#"{ "x-build": { "source": ["lib/a.js"], "output": "release/a.min.js" } }"#,
        )
        .unwrap();
        let cli = parse(&["--source", "lib/b.js", "--nocompile"]);

        let inv = resolve(&cli, &Config::default(), tmp.path()).unwrap();

        assert_eq!(
            inv.sources,
            [PathBuf::from("lib/a.js"), PathBuf::from("lib/b.js")]
        );
        assert_eq!(inv.output, PathBuf::from("release/a.min.js"));
        assert!(!inv.config.compile);
    }

    #[test]
    fn test_flags_map_to_configuration() {
        let tmp = TempDir::new().unwrap();
        let header = tmp.path().join("header.js");
        std::fs::write(&header, "/* (c) */\n").unwrap();
        let cli = parse(&[
            "--source", "a.js", "--output", "a.min.js", "--header",
            header.to_str().unwrap(), "--simple", "--nowrap", "--strict", "--es6in",
            "--es5out", "--pretty", "--keep", "--brew", "--option", "jscomp_off checkVars",
        ]);

        let inv = resolve(&cli, &Config::default(), tmp.path()).unwrap();
        let c = &inv.config;

        assert_eq!(c.header, "/* (c) */\n");
        assert!(!c.advanced_optimization);
        assert!(!c.wrap);
        assert!(c.strict && c.pretty && c.keep_temp_files);
        assert_eq!(c.language_in, Some(LanguageLevel::Es6));
        assert_eq!(c.language_out, Some(LanguageLevel::Es5));
        assert_eq!(c.backend_preference, BackendPreference::ForceLocalBinary);
        assert_eq!(c.extra_directives, ["jscomp_off checkVars"]);
    }

    #[test]
    fn test_config_defaults_apply() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.build.backend = Some("remote".to_string());
        config.build.advanced = Some(false);
        config.build.labels = vec!["verbose".to_string()];
        let cli = parse(&["--source", "a.js", "--output", "a.min.js"]);

        let inv = resolve(&cli, &config, tmp.path()).unwrap();

        assert_eq!(inv.config.backend_preference, BackendPreference::Remote);
        assert!(!inv.config.advanced_optimization);
        assert_eq!(inv.config.labels, ["verbose"]);
    }

    #[test]
    fn test_missing_output_is_error() {
        let tmp = TempDir::new().unwrap();
        let cli = parse(&["--source", "a.js"]);

        let err = resolve(&cli, &Config::default(), tmp.path()).unwrap_err();
        assert!(err.to_string().contains("no output file"));
    }

    #[test]
    fn test_bare_positional_is_error() {
        let tmp = TempDir::new().unwrap();
        let cli = parse(&["dev", "--source", "a.js", "--output", "a.min.js"]);

        assert!(resolve(&cli, &Config::default(), tmp.path()).is_err());
    }
}
