//! Pipeline documents.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! A [`Document`] is an immutable unit flowing through the site pipeline:
//! an identity, a metadata map and a byte payload. Stages never mutate a
//! document; they ask a [`DocumentFactory`] for a new one derived from it.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

/// Well-known metadata keys.
pub mod keys {
    /// Path of the document relative to the input root (e.g. `css/site.scss`).
    pub const RELATIVE_FILE_PATH: &str = "relative-file-path";

    /// Path the document should be written to, relative to the output root.
    pub const WRITE_PATH: &str = "write-path";
}

/// Document metadata: string keys to JSON values, kept in key order.
pub type Metadata = BTreeMap<String, Value>;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique document identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// A unit of content with metadata.
///
/// Cloning is cheap: the content bytes are shared.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    source: Option<PathBuf>,
    metadata: Metadata,
    content: Arc<[u8]>,
}

impl Document {
    /// Create a document with a fresh id, no source and no metadata.
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        let content: Vec<u8> = content.into();
        Self {
            id: DocumentId::next(),
            source: None,
            metadata: Metadata::new(),
            content: Arc::from(content),
        }
    }

    /// Set the path this document was read from.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set a metadata value.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Path this document was originally read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Look up a metadata value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Look up a metadata value that is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Raw content bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// A fresh reader over the content.
    pub fn content_reader(&self) -> impl Read + '_ {
        Cursor::new(&*self.content)
    }

    /// Content decoded as UTF-8.
    pub fn content_string(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.content)
    }
}

/// Creates documents derived from existing ones.
///
/// The pipeline owns document identity and lineage; stages go through this
/// trait instead of building documents by hand.
pub trait DocumentFactory: Send + Sync {
    /// Build a new document from `parent`, replacing its content and
    /// layering `overlay` on top of its metadata.
    fn derive(&self, parent: &Document, content: Vec<u8>, overlay: Metadata) -> Document;
}

/// Factory that assigns a fresh id, keeps the parent's source, and merges
/// the overlay over a copy of the parent's metadata.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultDocumentFactory;

impl DocumentFactory for DefaultDocumentFactory {
    fn derive(&self, parent: &Document, content: Vec<u8>, overlay: Metadata) -> Document {
        let mut metadata = parent.metadata.clone();
        metadata.extend(overlay);
        Document {
            id: DocumentId::next(),
            source: parent.source.clone(),
            metadata,
            content: Arc::from(content),
        }
    }
}
