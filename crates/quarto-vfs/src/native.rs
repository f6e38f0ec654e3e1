/*
 * native.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Disk-backed FileStore rooted at a project directory.
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::path::normalize_path;
use crate::traits::{FileStore, VfsError, VfsResult};

/// A `FileStore` that reads from the real file system.
///
/// Relative paths are resolved against `root`. When the store is
/// [confined](NativeFileStore::confined), any path that normalizes to a
/// location outside `root` is rejected with [`VfsError::PathViolation`]
/// instead of being read.
#[derive(Debug, Clone)]
pub struct NativeFileStore {
    root: PathBuf,
    confined: bool,
}

impl NativeFileStore {
    /// Create a store rooted at `root`. Absolute paths outside the root are
    /// still readable.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            confined: false,
        }
    }

    /// Create a store that refuses to read outside `root`.
    pub fn confined(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            confined: true,
        }
    }

    /// The directory relative paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store path to a disk path, enforcing confinement.
    fn locate(&self, path: &Path) -> VfsResult<PathBuf> {
        let full = normalize_path(&self.root.join(path));
        if self.confined && !full.starts_with(normalize_path(&self.root)) {
            return Err(VfsError::PathViolation(path.to_path_buf()));
        }
        Ok(full)
    }
}

fn io_error(path: &Path, source: io::Error) -> VfsError {
    if source.kind() == io::ErrorKind::NotFound {
        VfsError::NotFound(path.to_path_buf())
    } else {
        VfsError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl FileStore for NativeFileStore {
    fn is_file(&self, path: &Path) -> VfsResult<bool> {
        let full = self.locate(path)?;
        match fs::metadata(&full) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(path, e)),
        }
    }

    fn is_dir(&self, path: &Path) -> VfsResult<bool> {
        let full = self.locate(path)?;
        match fs::metadata(&full) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(path, e)),
        }
    }

    fn read(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let full = self.locate(path)?;
        fs::read(&full).map_err(|e| io_error(path, e))
    }
}
