//! The compiler seam.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The batch never compiles SCSS itself. It hands source text and
//! [`CompileOptions`] to a [`SassCompiler`] and only looks at the
//! [`CompileResult`]. [`GrassCompiler`] is the production backend.

mod native;
mod rules;

pub use self::native::GrassCompiler;

use crate::options::CompileOptions;

/// Outcome of compiling one stylesheet.
///
/// `css == None` means the compilation failed; `error` then carries the
/// compiler's message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileResult {
    pub css: Option<String>,
    /// Only present when requested and supported by the backend
    pub source_map: Option<String>,
    pub error: Option<String>,
}

impl CompileResult {
    pub fn success(css: String) -> Self {
        Self {
            css: Some(css),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Attach a source map to a successful result.
    pub fn with_source_map(mut self, map: String) -> Self {
        self.source_map = Some(map);
        self
    }
}

/// A synchronous SCSS compiler.
///
/// Implementations are shared by every worker in a batch, so they must be
/// `Send + Sync`; per-document state belongs in the options.
pub trait SassCompiler: Send + Sync {
    /// Compile `source`, resolving imports through `options.importer`.
    ///
    /// Must not panic on malformed input: failures are reported as a result
    /// without CSS.
    fn compile(&self, source: &str, options: &CompileOptions<'_>) -> CompileResult;
}
