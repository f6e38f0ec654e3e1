/*
 * build.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Build command implementation
 */

//! Build command implementation.
//!
//! `quarto-scss build` compiles every stylesheet under an input directory:
//!
//! - configuration comes from `quarto-scss.toml` in the input directory (or
//!   `--config`), with command-line flags layered on top
//! - every `.scss`/`.sass` file that is not a partial becomes one document
//!   whose `relative-file-path` is its path relative to the input directory
//! - imports are resolved through a file store rooted at the input
//!   directory
//! - outputs are written to `<output-dir>/<write-path>`
//!
//! Stylesheets that fail to compile are reported as warnings and produce no
//! output; they do not fail the command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};
use walkdir::WalkDir;

use quarto_scss::{DefaultDocumentFactory, Document, OutputStyle, ScssBatch, ScssConfig, keys};
use quarto_vfs::NativeFileStore;

/// Name of the configuration file looked up in the input directory
pub const CONFIG_FILE_NAME: &str = "quarto-scss.toml";

/// Arguments for the build command
#[derive(Debug)]
pub struct BuildArgs {
    /// Directory containing the stylesheets
    pub input_dir: PathBuf,
    /// Directory compiled files are written to
    pub output_dir: PathBuf,
    /// Extra include paths, appended after configured ones
    pub include_paths: Vec<PathBuf>,
    pub style: Option<OutputStyle>,
    pub source_map: bool,
    pub no_source_comments: bool,
    pub jobs: Option<usize>,
    /// Explicit configuration file
    pub config: Option<PathBuf>,
}

/// Execute the build command
pub fn execute(args: BuildArgs) -> Result<()> {
    if !args.input_dir.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", args.input_dir.display());
    }

    let config = load_config(&args)?;
    let batch = ScssBatch::from_config(&config).context("Invalid SCSS configuration")?;
    debug!(?batch, "configured SCSS batch");

    let documents = collect_documents(&args.input_dir, &args.output_dir)?;
    info!(
        "Compiling {} stylesheet(s) from {}",
        documents.len(),
        args.input_dir.display()
    );

    let store = NativeFileStore::new(&args.input_dir);
    let outputs = batch
        .execute(&documents, &store, &DefaultDocumentFactory)
        .context("Failed to run SCSS batch")?;

    let mut css = 0;
    let mut maps = 0;
    for output in &outputs {
        let path = write_output(output, &args.output_dir)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("map") => maps += 1,
            _ => css += 1,
        }
    }

    info!(
        documents = documents.len(),
        css,
        maps,
        failed = documents.len().saturating_sub(css),
        "Wrote output to {}",
        args.output_dir.display()
    );
    Ok(())
}

/// Read the configuration file (if any) and apply command-line overrides.
fn load_config(args: &BuildArgs) -> Result<ScssConfig> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => {
            let default = args.input_dir.join(CONFIG_FILE_NAME);
            default.is_file().then_some(default)
        }
    };

    let mut config = match path {
        Some(path) => {
            debug!(config = %path.display(), "loading configuration");
            let source = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            ScssConfig::from_toml_str(&source)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        }
        None => ScssConfig::default(),
    };

    config.include_paths.extend(args.include_paths.iter().cloned());
    if let Some(style) = args.style {
        config.output_style = style;
    }
    if args.source_map {
        config.source_map = true;
    }
    if args.no_source_comments {
        config.source_comments = false;
    }
    if args.jobs.is_some() {
        config.jobs = args.jobs;
    }
    Ok(config)
}

/// One document per non-partial stylesheet under `input_dir`, in path order.
///
/// `output_dir` is skipped when it lives inside the input directory.
fn collect_documents(input_dir: &Path, output_dir: &Path) -> Result<Vec<Document>> {
    let output_dir = fs::canonicalize(output_dir).ok();
    let is_output_dir = |path: &Path| {
        output_dir
            .as_deref()
            .is_some_and(|out| fs::canonicalize(path).is_ok_and(|p| p == out))
    };

    let mut documents = Vec::new();
    let walker = WalkDir::new(input_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(e.file_type().is_dir() && is_output_dir(e.path())));

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", input_dir.display()))?;
        if !entry.file_type().is_file() || !is_stylesheet(entry.path()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(input_dir)
            .with_context(|| format!("{} is outside the input directory", entry.path().display()))?;
        let content = fs::read(entry.path())
            .with_context(|| format!("Failed to read stylesheet: {}", entry.path().display()))?;

        documents.push(
            Document::new(content)
                .with_source(entry.path())
                .with_metadata(keys::RELATIVE_FILE_PATH, slash_path(relative)),
        );
    }
    Ok(documents)
}

/// `.scss`/`.sass` files whose name does not start with `_`.
fn is_stylesheet(path: &Path) -> bool {
    let is_partial = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'));
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("scss") || e.eq_ignore_ascii_case("sass"));
    has_extension && !is_partial
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write one output document below `output_dir`, returning the file path.
fn write_output(document: &Document, output_dir: &Path) -> Result<PathBuf> {
    let write_path = document
        .get_str(keys::WRITE_PATH)
        .with_context(|| format!("Output {} has no {} metadata", document.id(), keys::WRITE_PATH))?;
    let path = output_dir.join(write_path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(&path, document.content())
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    debug!(output = %path.display(), "wrote output");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(input_dir: &Path) -> BuildArgs {
        BuildArgs {
            input_dir: input_dir.to_path_buf(),
            output_dir: input_dir.join("_site"),
            include_paths: Vec::new(),
            style: None,
            source_map: false,
            no_source_comments: false,
            jobs: None,
            config: None,
        }
    }

    #[test]
    fn test_is_stylesheet() {
        assert!(is_stylesheet(Path::new("css/site.scss")));
        assert!(is_stylesheet(Path::new("theme.SASS")));
        assert!(!is_stylesheet(Path::new("css/_vars.scss")));
        assert!(!is_stylesheet(Path::new("plain.css")));
        assert!(!is_stylesheet(Path::new("README")));
    }

    #[test]
    fn test_slash_path() {
        assert_eq!(slash_path(&Path::new("css").join("site.scss")), "css/site.scss");
    }

    #[test]
    fn test_config_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&args(dir.path())).unwrap();
        assert_eq!(config, ScssConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[scss]\ninclude-paths = [\"vendor\"]\noutput-style = \"compressed\"\njobs = 8\n",
        )
        .unwrap();

        let mut args = args(dir.path());
        args.include_paths = vec![PathBuf::from("shared")];
        args.style = Some(OutputStyle::Expanded);
        args.no_source_comments = true;
        args.jobs = Some(2);

        let config = load_config(&args).unwrap();
        assert_eq!(
            config.include_paths,
            vec![PathBuf::from("vendor"), PathBuf::from("shared")]
        );
        assert_eq!(config.output_style, OutputStyle::Expanded);
        assert!(!config.source_comments);
        assert!(!config.source_map);
        assert_eq!(config.jobs, Some(2));
    }

    #[test]
    fn test_invalid_config_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[scss]\nstyle = \"compact\"\n").unwrap();
        assert!(load_config(&args(dir.path())).is_err());
    }

    #[test]
    fn test_collect_skips_partials_and_output_dir() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::create_dir_all(root.join("_site")).unwrap();
        fs::write(root.join("css/site.scss"), "a {}").unwrap();
        fs::write(root.join("css/_vars.scss"), "$a: 1;").unwrap();
        fs::write(root.join("_site/stale.scss"), "b {}").unwrap();
        fs::write(root.join("main.sass"), "a\n  b: c\n").unwrap();

        let documents = collect_documents(root, &root.join("_site")).unwrap();
        let paths: Vec<_> = documents
            .iter()
            .map(|d| d.get_str(keys::RELATIVE_FILE_PATH).unwrap())
            .collect();
        assert_eq!(paths, vec!["css/site.scss", "main.sass"]);
    }
}
