//! Per-document compile options.
//!
//! Copyright (c) 2025 Posit, PBC

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ScssError;
use crate::resolver::Importer;

/// Formatting mode of the generated CSS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum OutputStyle {
    /// One rule per line
    #[default]
    Compact,
    /// One declaration per line, rules separated by blank lines
    Expanded,
    /// Minimal whitespace
    Compressed,
    /// Indentation mirrors the SCSS nesting
    Nested,
}

impl OutputStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputStyle::Compact => "compact",
            OutputStyle::Expanded => "expanded",
            OutputStyle::Compressed => "compressed",
            OutputStyle::Nested => "nested",
        }
    }
}

impl fmt::Display for OutputStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputStyle {
    type Err = ScssError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(OutputStyle::Compact),
            "expanded" => Ok(OutputStyle::Expanded),
            "compressed" => Ok(OutputStyle::Compressed),
            "nested" => Ok(OutputStyle::Nested),
            _ => Err(ScssError::InvalidOutputStyle(s.to_string())),
        }
    }
}

impl TryFrom<String> for OutputStyle {
    type Error = ScssError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Everything a [`SassCompiler`](crate::SassCompiler) needs for one
/// document.
///
/// Built fresh for every document because it borrows that document's
/// importer; it is never shared between compilations.
pub struct CompileOptions<'a> {
    pub output_style: OutputStyle,
    /// Emit comments pointing back at the SCSS source lines
    pub source_comments: bool,
    /// Produce a source map alongside the CSS
    pub source_map: bool,
    /// Logical path of the entry stylesheet
    pub input_path: PathBuf,
    /// Extra roots searched for `@import`, in order
    pub include_paths: &'a [PathBuf],
    /// Callback answering `@import` requests
    pub importer: &'a dyn Importer,
}

impl CompileOptions<'_> {
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }
}

impl fmt::Debug for CompileOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("output_style", &self.output_style)
            .field("source_comments", &self.source_comments)
            .field("source_map", &self.source_map)
            .field("input_path", &self.input_path)
            .field("include_paths", &self.include_paths)
            .field("importer", &"<Importer>")
            .finish()
    }
}
