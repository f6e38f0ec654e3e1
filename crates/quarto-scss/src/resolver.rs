//! `@import` resolution against a file store.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The compiler asks "which file satisfies `@import "<specifier>"` written
//! in `<requester>`?". [`ImportResolver`] answers by probing a
//! [`FileStore`] with Sass naming conventions, never the real disk.
//!
//! # Search order
//!
//! Roots are the requester's directory followed by each include path. For
//! every root the candidates are, in order:
//!
//! 1. `root/spec` as given
//! 2. `root/_spec` (partial)
//! 3. `root/spec.scss`, `root/_spec.scss` (only when `spec` has no Sass extension)
//! 4. `root/spec.sass`, `root/_spec.sass` (same condition)
//!
//! The first candidate the store reports as a file wins. When nothing
//! matches, the resolver answers [`ImportResponse::Defer`] and the compiler
//! falls back to its own resolution.

use std::path::{Path, PathBuf};

use quarto_vfs::{FileStore, normalize_path};
use tracing::{debug, trace};

/// Extensions that mark a specifier as already naming a stylesheet.
const SASS_EXTENSIONS: [&str; 3] = ["scss", "sass", "css"];

/// A successfully resolved import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    /// Path of the file within the store
    pub path: PathBuf,
    /// Full stylesheet source
    pub contents: String,
}

/// Answer to an import request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportResponse {
    Resolved(ResolvedImport),
    /// Let the compiler try its built-in resolution
    Defer,
}

impl ImportResponse {
    pub fn resolved(self) -> Option<ResolvedImport> {
        match self {
            ImportResponse::Resolved(import) => Some(import),
            ImportResponse::Defer => None,
        }
    }
}

/// Callback shape the compiler uses for `@import`.
pub trait Importer {
    /// Resolve `specifier` as written in the file at `requester`.
    ///
    /// An empty `requester` means the entry stylesheet.
    fn import(&self, specifier: &str, requester: &Path) -> ImportResponse;

    /// Whether `path` is a directory the importer can see.
    ///
    /// Compilers ask this before looking for `<dir>/_index` stylesheets.
    /// The default sees no directories.
    fn is_dir(&self, _path: &Path) -> bool {
        false
    }
}

/// [`Importer`] that searches a [`FileStore`].
///
/// One resolver is bound to one document's compilation: it remembers that
/// document's input path and borrows the batch's include paths. It holds no
/// mutable state, so it needs no locking.
#[derive(Clone, Copy)]
pub struct ImportResolver<'a> {
    store: &'a dyn FileStore,
    input_path: &'a Path,
    include_paths: &'a [PathBuf],
}

impl<'a> ImportResolver<'a> {
    pub fn new(
        store: &'a dyn FileStore,
        input_path: &'a Path,
        include_paths: &'a [PathBuf],
    ) -> Self {
        Self {
            store,
            input_path,
            include_paths,
        }
    }

    /// Input path of the document this resolver is bound to.
    pub fn input_path(&self) -> &Path {
        self.input_path
    }

    /// All candidate paths for a request, in search order, without
    /// duplicates.
    pub fn candidates(&self, specifier: &str, requester: &Path) -> Vec<PathBuf> {
        let spec = Path::new(specifier);
        let variants = name_variants(spec);

        if spec.is_absolute() {
            return dedup(variants.into_iter().map(|v| normalize_path(&v)));
        }

        let requester = if requester.as_os_str().is_empty() {
            self.input_path
        } else {
            requester
        };
        let requester_dir = requester.parent().unwrap_or_else(|| Path::new(""));

        let roots = std::iter::once(requester_dir).chain(self.include_paths.iter().map(PathBuf::as_path));
        dedup(roots.flat_map(|root| variants.iter().map(move |v| normalize_path(&root.join(v)))))
    }

    /// First candidate that exists in the store.
    ///
    /// Store errors while probing are soft misses: the search continues, and
    /// anything other than "not found" is logged.
    pub fn locate(&self, specifier: &str, requester: &Path) -> Option<PathBuf> {
        self.candidates(specifier, requester)
            .into_iter()
            .find(|candidate| match self.store.is_file(candidate) {
                Ok(found) => found,
                Err(e) if e.is_not_found() => false,
                Err(e) => {
                    trace!(candidate = %candidate.display(), error = %e, "import candidate probe failed");
                    false
                }
            })
    }

    /// Locate and read the file satisfying an import.
    pub fn resolve(&self, specifier: &str, requester: &Path) -> ImportResponse {
        let Some(path) = self.locate(specifier, requester) else {
            debug!(specifier, requester = %requester.display(), "import not found in store, deferring");
            return ImportResponse::Defer;
        };

        match self.store.read_string(&path) {
            Ok(contents) => {
                debug!(specifier, requester = %requester.display(), resolved = %path.display(), "resolved import");
                ImportResponse::Resolved(ResolvedImport { path, contents })
            }
            Err(e) => {
                debug!(specifier, path = %path.display(), error = %e, "failed to read import, deferring");
                ImportResponse::Defer
            }
        }
    }
}

impl Importer for ImportResolver<'_> {
    fn import(&self, specifier: &str, requester: &Path) -> ImportResponse {
        self.resolve(specifier, requester)
    }

    fn is_dir(&self, path: &Path) -> bool {
        match self.store.is_dir(&normalize_path(path)) {
            Ok(found) => found,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                trace!(path = %path.display(), error = %e, "directory probe failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for ImportResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportResolver")
            .field("store", &"<FileStore>")
            .field("input_path", &self.input_path)
            .field("include_paths", &self.include_paths)
            .finish()
    }
}

/// True when the path ends in `.scss`, `.sass` or `.css`.
pub(crate) fn has_sass_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SASS_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Relative names to try for one root, in order.
fn name_variants(spec: &Path) -> Vec<PathBuf> {
    let partial = partial_of(spec);
    let mut names = vec![spec.to_path_buf()];
    names.extend(partial.clone());

    if !has_sass_extension(spec) {
        for ext in ["scss", "sass"] {
            names.push(with_appended_extension(spec, ext));
            if let Some(partial) = &partial {
                names.push(with_appended_extension(partial, ext));
            }
        }
    }
    names
}

/// `dir/name` -> `dir/_name`; `None` if the name already starts with `_`.
fn partial_of(spec: &Path) -> Option<PathBuf> {
    let name = spec.file_name()?.to_str()?;
    if name.starts_with('_') {
        return None;
    }
    Some(spec.with_file_name(format!("_{name}")))
}

/// Append an extension without replacing an existing one
/// (`bootstrap.min` -> `bootstrap.min.scss`).
fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn dedup(paths: impl Iterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = Vec::new();
    for path in paths {
        if !seen.contains(&path) {
            seen.push(path);
        }
    }
    seen
}
