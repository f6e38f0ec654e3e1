//! Choosing the logical input path of a document.
//!
//! Copyright (c) 2025 Posit, PBC

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::document::{Document, keys};
use crate::error::ScssError;

type SelectorFn = dyn Fn(&Document) -> Option<PathBuf> + Send + Sync;

/// Rule that picks the path a document is compiled "as".
///
/// The path drives relative `@import` resolution, the input syntax (a
/// `.sass` path compiles as indented syntax) and the output path (same path
/// with a `.css` extension).
///
/// Textual form (used in configuration files):
/// - `meta:<key>`: the string value of metadata `<key>`
/// - `source`: the path the document was read from
#[derive(Clone)]
pub enum InputPathSelector {
    /// String value of a metadata key
    Metadata(String),
    /// The document's source path
    Source,
    /// Arbitrary caller-supplied rule
    Custom(Arc<SelectorFn>),
}

impl InputPathSelector {
    /// Wrap a closure as a selector.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Document) -> Option<PathBuf> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Apply the rule. Empty strings count as absent.
    pub fn select(&self, document: &Document) -> Option<PathBuf> {
        let path = match self {
            Self::Metadata(key) => document.get_str(key).map(PathBuf::from),
            Self::Source => document.source().map(|p| p.to_path_buf()),
            Self::Custom(f) => f(document),
        };
        path.filter(|p| !p.as_os_str().is_empty())
    }
}

impl Default for InputPathSelector {
    fn default() -> Self {
        Self::Metadata(keys::RELATIVE_FILE_PATH.to_string())
    }
}

impl fmt::Debug for InputPathSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata(key) => f.debug_tuple("Metadata").field(key).finish(),
            Self::Source => f.write_str("Source"),
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

impl FromStr for InputPathSelector {
    type Err = ScssError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ScssError::MissingInputPath);
        }
        if s == "source" {
            return Ok(Self::Source);
        }
        match s.strip_prefix("meta:").map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Self::Metadata(key.to_string())),
            _ => Err(ScssError::InvalidSelector(s.to_string())),
        }
    }
}
