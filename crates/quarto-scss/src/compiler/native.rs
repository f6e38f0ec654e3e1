//! SASS compilation using the grass crate.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! grass resolves imports by probing concrete paths through a `grass::Fs`;
//! it has no import callback. [`ImporterFs`] puts the [`Importer`] in
//! charge anyway:
//!
//! - the entry document is served from memory at its logical input path
//! - every stylesheet it serves is scanned for load rules, and for each URL
//!   it predicts the first path grass will probe (`<dir>/<url>` with an
//!   `.import.*` extension); grass always tries that path first
//! - when grass probes it, the importer is asked about the URL as written
//!   in that stylesheet. If it resolves, the probe succeeds and
//!   `canonicalize` maps it to the importer's file, so grass reads that
//!   file and resolves its nested imports from its directory
//! - other probes are turned back into a bare specifier and accepted only
//!   if the importer picks exactly that path
//! - when the importer defers, the probe goes to grass's own file system
//!   (`grass::StdFs`)
//!
//! Include paths are also passed to grass as load paths so that its own
//! probing reaches them once the importer has deferred.

use std::collections::HashMap;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use grass::{Fs, StdFs};
use quarto_vfs::normalize_path;
use tracing::{debug, trace};

use super::rules::load_urls;
use super::{CompileResult, SassCompiler};
use crate::options::{CompileOptions, OutputStyle};
use crate::resolver::{ImportResponse, Importer, has_sass_extension};

/// Default backend: the pure-Rust `grass` compiler.
///
/// grass targets dart-sass, which only knows the expanded and compressed
/// output styles, and emits neither source comments nor source maps.
/// `compact` and `nested` therefore render as expanded, and results never
/// carry a source map.
#[derive(Debug, Clone, Default)]
pub struct GrassCompiler {
    quiet: bool,
}

impl GrassCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress `@warn` and `@debug` output from stylesheets.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

fn grass_style(style: OutputStyle) -> grass::OutputStyle {
    match style {
        OutputStyle::Compressed => grass::OutputStyle::Compressed,
        OutputStyle::Expanded => grass::OutputStyle::Expanded,
        OutputStyle::Compact | OutputStyle::Nested => {
            debug!(style = %style, "output style not supported by grass, using expanded");
            grass::OutputStyle::Expanded
        }
    }
}

impl SassCompiler for GrassCompiler {
    fn compile(&self, source: &str, options: &CompileOptions<'_>) -> CompileResult {
        if options.source_map {
            debug!(input = %options.input_path.display(), "source maps are not supported by grass");
        }
        if options.source_comments {
            trace!("source comments are not supported by grass");
        }

        let fs = ImporterFs::new(options.input_path(), source, options.importer);
        let grass_options = grass::Options::default()
            .fs(&fs)
            .load_paths(options.include_paths)
            .style(grass_style(options.output_style))
            .quiet(self.quiet);

        match grass::from_path(options.input_path(), &grass_options) {
            Ok(css) => CompileResult::success(css),
            Err(e) => {
                let message = e.to_string();
                debug!(input = %options.input_path.display(), "SASS compilation failed: {}", message);
                CompileResult::failure(message)
            }
        }
    }
}

/// A load rule seen in a served stylesheet, keyed by its first probe.
#[derive(Debug, Clone)]
enum Route {
    /// Not asked yet
    Pending { url: String, requester: PathBuf },
    /// The importer picked this file
    Resolved(PathBuf),
    /// The importer had no answer
    Deferred,
}

/// What the importer said about one probed path that matches no route.
#[derive(Debug, Clone)]
enum Probe {
    /// The importer picked this exact path
    Accepted(Vec<u8>),
    /// The importer picked a different file for the same specifier
    Rejected,
    /// The importer had no answer; ask grass's own file system
    Deferred,
}

#[derive(Debug, Default)]
struct State {
    routes: HashMap<PathBuf, Route>,
    /// Contents of the files routes resolved to
    resolved: HashMap<PathBuf, Vec<u8>>,
    probes: HashMap<PathBuf, Probe>,
}

/// Adapter that implements `grass::Fs` on top of an [`Importer`].
///
/// All paths are normalized before lookup.
struct ImporterFs<'a> {
    entry_path: PathBuf,
    entry_source: &'a str,
    importer: &'a dyn Importer,
    state: Mutex<State>,
}

impl<'a> ImporterFs<'a> {
    fn new(entry_path: &Path, entry_source: &'a str, importer: &'a dyn Importer) -> Self {
        let fs = Self {
            entry_path: normalize_path(entry_path),
            entry_source,
            importer,
            state: Mutex::new(State::default()),
        };
        fs.register(&fs.entry_path, entry_source);
        fs
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_entry(&self, path: &Path) -> bool {
        normalize_path(path) == self.entry_path
    }

    /// Record a route for every load rule in a stylesheet served at
    /// `requester`.
    fn register(&self, requester: &Path, source: &str) {
        let urls = load_urls(source);
        if urls.is_empty() {
            return;
        }
        let mut state = self.state();
        for url in urls {
            let Some(key) = first_probe(requester, &url) else {
                continue;
            };
            state.routes.entry(key).or_insert_with(|| Route::Pending {
                url,
                requester: requester.to_path_buf(),
            });
        }
    }

    /// Answer for the route whose first probe is `key`, asking the importer
    /// on first use.
    fn route(&self, key: &Path) -> Option<Route> {
        let mut state = self.state();
        let (url, requester) = match state.routes.get(key)?.clone() {
            Route::Pending { url, requester } => (url, requester),
            answered => return Some(answered),
        };

        let answer = match self.importer.import(&url, &requester) {
            ImportResponse::Resolved(import) => {
                let target = normalize_path(&import.path);
                trace!(url = %url, requester = %requester.display(), target = %target.display(), "import routed");
                state.resolved.insert(target.clone(), import.contents.into_bytes());
                Route::Resolved(target)
            }
            ImportResponse::Defer => Route::Deferred,
        };
        state.routes.insert(key.to_path_buf(), answer.clone());
        Some(answer)
    }

    /// The path grass should treat `key` as.
    fn canonical(&self, key: PathBuf) -> PathBuf {
        match self.state().routes.get(&key) {
            Some(Route::Resolved(target)) => target.clone(),
            _ => key,
        }
    }

    /// Ask the importer about a probed path, memoized per path.
    fn probe(&self, key: &Path) -> Probe {
        let mut state = self.state();
        if let Some(probe) = state.probes.get(key) {
            return probe.clone();
        }

        let probe = match bare_specifier(key) {
            None => Probe::Deferred,
            Some(specifier) => match self.importer.import(&specifier, key) {
                ImportResponse::Resolved(import) if normalize_path(&import.path) == key => {
                    Probe::Accepted(import.contents.into_bytes())
                }
                ImportResponse::Resolved(import) => {
                    trace!(probe = %key.display(), chosen = %import.path.display(), "probe rejected");
                    Probe::Rejected
                }
                ImportResponse::Defer => Probe::Deferred,
            },
        };
        state.probes.insert(key.to_path_buf(), probe.clone());
        probe
    }
}

impl Debug for ImporterFs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImporterFs")
            .field("entry_path", &self.entry_path)
            .field("importer", &"<Importer>")
            .finish_non_exhaustive()
    }
}

impl Fs for ImporterFs<'_> {
    fn is_dir(&self, path: &Path) -> bool {
        self.importer.is_dir(path) || StdFs.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        if self.is_entry(path) {
            return true;
        }
        let key = normalize_path(path);
        if let Some(Route::Resolved(_)) = self.route(&key) {
            return true;
        }
        if self.state().resolved.contains_key(&key) {
            return true;
        }
        match self.probe(&key) {
            Probe::Accepted(_) => true,
            Probe::Rejected => false,
            Probe::Deferred => StdFs.is_file(path),
        }
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        if self.is_entry(path) {
            return Ok(self.entry_source.as_bytes().to_vec());
        }

        let key = self.canonical(normalize_path(path));
        let resolved = self.state().resolved.get(&key).cloned();
        let contents = match resolved {
            Some(contents) => contents,
            None => match self.probe(&key) {
                Probe::Accepted(contents) => contents,
                Probe::Rejected => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("{} is shadowed by another import candidate", path.display()),
                    ));
                }
                Probe::Deferred => StdFs.read(path)?,
            },
        };

        self.register(&key, &String::from_utf8_lossy(&contents));
        Ok(contents)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(self.canonical(normalize_path(path)))
    }
}

/// The first path grass probes for `url` written in the stylesheet at
/// `requester`.
fn first_probe(requester: &Path, url: &str) -> Option<PathBuf> {
    let url = Path::new(url);
    let joined = if url.is_absolute() {
        url.to_path_buf()
    } else {
        requester.parent().unwrap_or_else(|| Path::new("")).join(url)
    };
    joined.file_name()?;

    let probe = match joined.extension().and_then(|e| e.to_str()) {
        Some(ext @ ("scss" | "sass" | "css")) => joined.with_extension(format!(".import{ext}")),
        _ => joined.with_extension("import.sass"),
    };
    Some(normalize_path(&probe))
}

/// Recover the specifier a probe was built from: file name without a Sass
/// extension and without the partial underscore.
fn bare_specifier(path: &Path) -> Option<String> {
    let name = if has_sass_extension(path) {
        path.file_stem()?
    } else {
        path.file_name()?
    };
    let name = name.to_str()?;
    let name = name.strip_prefix('_').unwrap_or(name);
    (!name.is_empty()).then(|| name.to_string())
}
