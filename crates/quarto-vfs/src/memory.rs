/*
 * memory.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * In-memory FileStore.
 *
 * Used by tests and by hosts that already hold project sources in memory
 * (for example documents held by an editor). Directories are implied by the
 * files they contain.
 */

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::path::normalize_path;
use crate::traits::{FileStore, VfsError, VfsResult};

#[derive(Debug, Default)]
struct Tree {
    /// File contents, keyed by normalized path
    files: HashMap<PathBuf, Vec<u8>>,
    /// Directory entries (parents of all files)
    directories: HashSet<PathBuf>,
}

impl Tree {
    fn insert(&mut self, path: PathBuf, contents: Vec<u8>) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() || !self.directories.insert(dir.to_path_buf()) {
                break;
            }
            current = dir.parent();
        }
        self.files.insert(path, contents);
    }
}

/// A `FileStore` backed by a map of paths to bytes.
///
/// Paths are normalized lexically on insert and on lookup, so `a/./b.scss`
/// and `a/c/../b.scss` name the same file. Relative and absolute paths are
/// distinct keys; use one convention consistently.
///
/// Thread safety: uses an `RwLock` so concurrent readers never block each
/// other.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    tree: RwLock<Tree>,
}

impl MemoryFileStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `(path, contents)` pairs.
    pub fn from_files<P, C, I>(files: I) -> Self
    where
        P: AsRef<Path>,
        C: Into<Vec<u8>>,
        I: IntoIterator<Item = (P, C)>,
    {
        let store = Self::new();
        for (path, contents) in files {
            store.add_file(path, contents);
        }
        store
    }

    /// Add (or replace) a file. Parent directories are created implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let normalized = normalize_path(path.as_ref());
        self.write_tree().insert(normalized, contents.into());
    }

    fn read_tree(&self) -> std::sync::RwLockReadGuard<'_, Tree> {
        // A poisoned lock only means a writer panicked mid-insert; the map
        // itself is still consistent.
        self.tree.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_tree(&self) -> std::sync::RwLockWriteGuard<'_, Tree> {
        self.tree.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl FileStore for MemoryFileStore {
    fn is_file(&self, path: &Path) -> VfsResult<bool> {
        Ok(self.read_tree().files.contains_key(&normalize_path(path)))
    }

    fn is_dir(&self, path: &Path) -> VfsResult<bool> {
        Ok(self.read_tree().directories.contains(&normalize_path(path)))
    }

    fn read(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = normalize_path(path);
        self.read_tree()
            .files
            .get(&normalized)
            .cloned()
            .ok_or(VfsError::NotFound(normalized))
    }
}
