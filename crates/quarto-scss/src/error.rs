//! Error types for SCSS pipeline setup.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! Only configuration problems are errors. Failures while compiling an
//! individual document are logged and the document is skipped; they never
//! reach the caller as an `Err`.

use thiserror::Error;

/// Errors that can occur while configuring or starting a batch
#[derive(Debug, Error)]
pub enum ScssError {
    /// No input path selector was given
    #[error("input path selector is empty; expected `source` or `meta:<key>`")]
    MissingInputPath,

    /// The input path selector could not be parsed
    #[error("invalid input path selector `{0}`; expected `source` or `meta:<key>`")]
    InvalidSelector(String),

    /// Unknown output style name
    #[error("unknown output style `{0}` (expected compact, expanded, compressed or nested)")]
    InvalidOutputStyle(String),

    /// An include path entry was empty
    #[error("include path #{index} is empty")]
    InvalidIncludePath { index: usize },

    /// Worker count of zero
    #[error("worker count must be at least 1")]
    InvalidJobs,

    /// Configuration file could not be parsed
    #[error("failed to parse SCSS configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Dedicated worker pool could not be created
    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
