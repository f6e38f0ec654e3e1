//! Lexical path helpers shared by the stores and the import resolver.
//!
//! Copyright (c) 2025 Posit, PBC

use std::path::{Component, Path, PathBuf};

/// Normalize path components without touching the file system.
///
/// Removes `.` components and resolves `..` against the preceding
/// component. A `..` that would climb above the start of a relative path is
/// kept, so `../x` stays `../x`; above the root of an absolute path it is
/// dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_cur_dir() {
        assert_eq!(normalize_path(Path::new("./a/./b.scss")), PathBuf::from("a/b.scss"));
    }

    #[test]
    fn test_normalize_resolves_parent_dir() {
        assert_eq!(normalize_path(Path::new("a/b/../c.scss")), PathBuf::from("a/c.scss"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_dir() {
        assert_eq!(normalize_path(Path::new("../x/y")), PathBuf::from("../x/y"));
        assert_eq!(normalize_path(Path::new("a/../../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_normalize_absolute_cannot_escape_root() {
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_path(Path::new("")), PathBuf::new());
    }
}
