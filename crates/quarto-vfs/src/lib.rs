/*
 * quarto-vfs
 * Copyright (c) 2025 Posit, PBC
 *
 * Read-only file store abstraction for the SCSS pipeline.
 *
 * Import resolution never touches the operating system directly. Every
 * existence check and every read goes through a `FileStore`, so the same
 * pipeline can run against:
 *
 * - NativeFileStore: the real disk, rooted at a project directory
 * - MemoryFileStore: an in-memory tree (tests, embedding)
 */

mod memory;
mod native;
mod path;
mod traits;

pub use memory::MemoryFileStore;
pub use native::NativeFileStore;
pub use path::normalize_path;
pub use traits::{FileStore, VfsError, VfsResult};
