/*
 * traits.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Defines the FileStore trait and its error type.
 */

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for file store operations
pub type VfsResult<T> = Result<T, VfsError>;

/// Errors that can occur while querying a file store
#[derive(Debug, Error)]
pub enum VfsError {
    /// Underlying I/O failure (permissions, broken symlink, ...)
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The path does not name a file in this store
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The path escapes the store's root
    #[error("Path outside allowed boundary: {}", .0.display())]
    PathViolation(PathBuf),

    /// The file exists but is not valid UTF-8
    #[error("Invalid UTF-8 in file {}", .0.display())]
    InvalidUtf8(PathBuf),
}

impl VfsError {
    /// True when the error only says "there is no such file".
    ///
    /// Callers that probe many candidates treat this as an ordinary miss
    /// and everything else as an unexpected failure worth logging.
    pub fn is_not_found(&self) -> bool {
        match self {
            VfsError::NotFound(_) => true,
            VfsError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Read-only, path-based access to a tree of files.
///
/// Implementations must tolerate concurrent readers: a batch compile shares
/// one store across every worker thread. Nothing in the pipeline writes
/// through this trait.
///
/// Relative paths are interpreted against the store's own root; absolute
/// paths are taken as-is (subject to any confinement the store enforces).
pub trait FileStore: Send + Sync {
    /// Check if path exists and is a file.
    fn is_file(&self, path: &Path) -> VfsResult<bool>;

    /// Check if path exists and is a directory.
    fn is_dir(&self, path: &Path) -> VfsResult<bool>;

    /// Read entire file contents as bytes.
    fn read(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Read file as string with UTF-8 encoding.
    ///
    /// Default implementation reads bytes and converts to string.
    fn read_string(&self, path: &Path) -> VfsResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| VfsError::InvalidUtf8(path.to_path_buf()))
    }
}

impl<T: FileStore + ?Sized> FileStore for &T {
    fn is_file(&self, path: &Path) -> VfsResult<bool> {
        (**self).is_file(path)
    }

    fn is_dir(&self, path: &Path) -> VfsResult<bool> {
        (**self).is_dir(path)
    }

    fn read(&self, path: &Path) -> VfsResult<Vec<u8>> {
        (**self).read(path)
    }
}

impl<T: FileStore + ?Sized> FileStore for std::sync::Arc<T> {
    fn is_file(&self, path: &Path) -> VfsResult<bool> {
        (**self).is_file(path)
    }

    fn is_dir(&self, path: &Path) -> VfsResult<bool> {
        (**self).is_dir(path)
    }

    fn read(&self, path: &Path) -> VfsResult<Vec<u8>> {
        (**self).read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(VfsError::NotFound(PathBuf::from("x")).is_not_found());
        assert!(
            VfsError::Io {
                path: PathBuf::from("x"),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
            .is_not_found()
        );
        assert!(
            !VfsError::Io {
                path: PathBuf::from("x"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }
            .is_not_found()
        );
        assert!(!VfsError::PathViolation(PathBuf::from("../x")).is_not_found());
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let err = VfsError::NotFound(PathBuf::from("styles/_vars.scss"));
        assert_eq!(err.to_string(), "File not found: styles/_vars.scss");
    }
}
