//! SCSS compilation for pipeline documents.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! This crate provides:
//! - A minimal document model (`Document`, `Metadata`, `DocumentFactory`)
//! - `@import` resolution against a [`quarto_vfs::FileStore`] (`ImportResolver`)
//! - A compiler seam (`SassCompiler`) with a `grass` backend (`GrassCompiler`)
//! - Parallel batch compilation with per-document failure isolation (`ScssBatch`)
//!
//! # Example
//!
//! ```rust,no_run
//! use quarto_scss::{DefaultDocumentFactory, Document, ScssBatch, keys};
//! use quarto_vfs::NativeFileStore;
//!
//! let store = NativeFileStore::new("styles");
//! let input = Document::new("$c: red; a { color: $c; }")
//!     .with_metadata(keys::RELATIVE_FILE_PATH, "site.scss");
//!
//! let batch = ScssBatch::new().with_expanded_output_style();
//! let outputs = batch.execute(&[input], &store, &DefaultDocumentFactory)?;
//! assert_eq!(outputs[0].get_str(keys::WRITE_PATH), Some("site.css"));
//! # Ok::<(), quarto_scss::ScssError>(())
//! ```

mod batch;
mod compiler;
mod config;
mod document;
mod error;
mod options;
mod resolver;
mod selector;

pub use batch::ScssBatch;
pub use compiler::{CompileResult, GrassCompiler, SassCompiler};
pub use config::ScssConfig;
pub use document::{DefaultDocumentFactory, Document, DocumentFactory, DocumentId, Metadata, keys};
pub use error::ScssError;
pub use options::{CompileOptions, OutputStyle};
pub use resolver::{ImportResolver, ImportResponse, Importer, ResolvedImport};
pub use selector::InputPathSelector;
