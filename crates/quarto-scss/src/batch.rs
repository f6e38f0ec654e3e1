//! Parallel compilation of a document set.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Every input document is compiled independently on the rayon pool:
//!
//! 1. pick the input path (or synthesize a placeholder)
//! 2. read the SCSS text
//! 3. bind a fresh [`ImportResolver`] and [`CompileOptions`] to that path
//! 4. run the [`SassCompiler`]
//! 5. derive a `.css` document, and a `.map` document when requested
//!
//! A document that fails at any step contributes nothing; its siblings are
//! unaffected. Output order is not input order.

use std::io::Read;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quarto_vfs::FileStore;
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::compiler::{GrassCompiler, SassCompiler};
use crate::config::ScssConfig;
use crate::document::{Document, DocumentFactory, Metadata, keys};
use crate::error::ScssError;
use crate::options::{CompileOptions, OutputStyle};
use crate::resolver::ImportResolver;
use crate::selector::InputPathSelector;

/// SCSS-to-CSS pipeline module.
///
/// Configuration is immutable once `execute` runs, and is shared read-only
/// by every worker.
#[derive(Clone)]
pub struct ScssBatch {
    input_path: InputPathSelector,
    include_paths: Vec<PathBuf>,
    source_comments: bool,
    output_style: OutputStyle,
    source_map: bool,
    jobs: Option<NonZeroUsize>,
    compiler: Arc<dyn SassCompiler>,
}

impl Default for ScssBatch {
    fn default() -> Self {
        Self {
            input_path: InputPathSelector::default(),
            include_paths: Vec::new(),
            source_comments: true,
            output_style: OutputStyle::default(),
            source_map: false,
            jobs: None,
            compiler: Arc::new(GrassCompiler::new()),
        }
    }
}

impl ScssBatch {
    /// Default settings with the grass backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a validated configuration.
    pub fn from_config(config: &ScssConfig) -> Result<Self, ScssError> {
        config.validate()?;
        Ok(Self::new()
            .with_input_path(config.selector()?)
            .with_include_paths(config.include_paths.iter().cloned())
            .include_source_comments(config.source_comments)
            .with_output_style(config.output_style)
            .generate_source_map(config.source_map)
            .with_jobs(config.jobs.unwrap_or(0)))
    }

    /// Rule used to pick each document's input path.
    pub fn with_input_path(mut self, selector: InputPathSelector) -> Self {
        self.input_path = selector;
        self
    }

    /// Shorthand for a custom [`InputPathSelector`].
    pub fn with_input_path_fn<F>(self, f: F) -> Self
    where
        F: Fn(&Document) -> Option<PathBuf> + Send + Sync + 'static,
    {
        self.with_input_path(InputPathSelector::custom(f))
    }

    /// Append include paths. Duplicates are dropped; order is kept.
    pub fn with_include_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        for path in paths {
            let path = path.into();
            if !self.include_paths.contains(&path) {
                self.include_paths.push(path);
            }
        }
        self
    }

    pub fn include_source_comments(mut self, enabled: bool) -> Self {
        self.source_comments = enabled;
        self
    }

    pub fn with_output_style(mut self, style: OutputStyle) -> Self {
        self.output_style = style;
        self
    }

    pub fn with_compact_output_style(self) -> Self {
        self.with_output_style(OutputStyle::Compact)
    }

    pub fn with_expanded_output_style(self) -> Self {
        self.with_output_style(OutputStyle::Expanded)
    }

    pub fn with_compressed_output_style(self) -> Self {
        self.with_output_style(OutputStyle::Compressed)
    }

    pub fn with_nested_output_style(self) -> Self {
        self.with_output_style(OutputStyle::Nested)
    }

    pub fn generate_source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    /// Run on a dedicated pool of `jobs` threads. `0` uses the global pool
    /// (one thread per available core).
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = NonZeroUsize::new(jobs);
        self
    }

    /// Replace the compiler backend.
    pub fn with_compiler(mut self, compiler: impl SassCompiler + 'static) -> Self {
        self.compiler = Arc::new(compiler);
        self
    }

    pub fn include_paths(&self) -> &[PathBuf] {
        &self.include_paths
    }

    pub fn output_style(&self) -> OutputStyle {
        self.output_style
    }

    pub fn source_comments(&self) -> bool {
        self.source_comments
    }

    pub fn source_map(&self) -> bool {
        self.source_map
    }

    pub fn jobs(&self) -> Option<usize> {
        self.jobs.map(NonZeroUsize::get)
    }

    /// Compile every document in parallel and collect the outputs.
    ///
    /// Only a failure to start a dedicated worker pool is an error;
    /// per-document failures are logged and skipped.
    pub fn execute(
        &self,
        inputs: &[Document],
        store: &dyn FileStore,
        factory: &dyn DocumentFactory,
    ) -> Result<Vec<Document>, ScssError> {
        let run = || -> Vec<Document> {
            inputs
                .par_iter()
                .flat_map_iter(|document| self.compile_document(document, store, factory))
                .collect()
        };

        let outputs = match self.jobs {
            Some(jobs) => rayon::ThreadPoolBuilder::new()
                .num_threads(jobs.get())
                .build()?
                .install(run),
            None => run(),
        };

        debug!(inputs = inputs.len(), outputs = outputs.len(), "SCSS batch finished");
        Ok(outputs)
    }

    /// Compile a single document: zero documents on failure, one `.css`
    /// document on success, plus a `.map` document when source maps are on
    /// and the compiler produced one.
    pub fn compile_document(
        &self,
        document: &Document,
        store: &dyn FileStore,
        factory: &dyn DocumentFactory,
    ) -> Vec<Document> {
        let input_path = self.input_path.select(document).unwrap_or_else(|| {
            let placeholder = PathBuf::from(format!("{}.scss", Uuid::new_v4()));
            warn!(
                document = %document.id(),
                placeholder = %placeholder.display(),
                "document has no input path; relative imports will resolve against a placeholder"
            );
            placeholder
        });

        let mut source = String::new();
        if let Err(e) = document.content_reader().read_to_string(&mut source) {
            warn!(document = %document.id(), input = %input_path.display(), error = %e, "cannot read SCSS content, skipping document");
            return Vec::new();
        }

        let resolver = ImportResolver::new(store, &input_path, &self.include_paths);
        let options = CompileOptions {
            output_style: self.output_style,
            source_comments: self.source_comments,
            source_map: self.source_map,
            input_path: input_path.clone(),
            include_paths: &self.include_paths,
            importer: &resolver,
        };

        let result = self.compiler.compile(&source, &options);
        let Some(css) = result.css else {
            warn!(
                document = %document.id(),
                input = %input_path.display(),
                "SCSS compilation failed, skipping document: {}",
                result.error.as_deref().unwrap_or("no CSS produced")
            );
            return Vec::new();
        };

        let mut outputs = vec![derive_output(factory, document, &input_path, "css", css)];
        if self.source_map {
            if let Some(map) = result.source_map {
                outputs.push(derive_output(factory, document, &input_path, "map", map));
            }
        }
        outputs
    }
}

impl std::fmt::Debug for ScssBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScssBatch")
            .field("input_path", &self.input_path)
            .field("include_paths", &self.include_paths)
            .field("source_comments", &self.source_comments)
            .field("output_style", &self.output_style)
            .field("source_map", &self.source_map)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

/// New document carrying `content`, addressed at the input path with its
/// extension replaced.
fn derive_output(
    factory: &dyn DocumentFactory,
    parent: &Document,
    input_path: &Path,
    extension: &str,
    content: String,
) -> Document {
    let output_path = input_path.with_extension(extension).to_string_lossy().into_owned();
    let mut overlay = Metadata::new();
    overlay.insert(keys::RELATIVE_FILE_PATH.to_string(), Value::from(output_path.clone()));
    overlay.insert(keys::WRITE_PATH.to_string(), Value::from(output_path));
    factory.derive(parent, content.into_bytes(), overlay)
}
