//! SCSS configuration from TOML.
//!
//! Copyright (c) 2025 Posit, PBC
//!
//! The configuration lives under a `[scss]` table:
//!
//! ```toml
//! [scss]
//! input-path = "meta:relative-file-path"
//! include-paths = ["vendor/bootstrap/scss", "shared"]
//! source-comments = false
//! output-style = "expanded"
//! source-map = true
//! jobs = 4
//! ```
//!
//! Every key is optional. Unknown keys are rejected so typos surface at
//! setup instead of silently falling back to defaults.

use std::path::PathBuf;

use serde::Deserialize;

use crate::document::keys;
use crate::error::ScssError;
use crate::options::OutputStyle;
use crate::selector::InputPathSelector;

/// Serializable form of the batch settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct ScssConfig {
    /// Input path selector, `meta:<key>` or `source`
    pub input_path: String,

    /// Extra `@import` search roots, searched in order
    pub include_paths: Vec<PathBuf>,

    /// Emit source comments (default on)
    pub source_comments: bool,

    pub output_style: OutputStyle,

    /// Emit a `.map` document next to each `.css` document (default off)
    pub source_map: bool,

    /// Worker threads; `None` uses one per available core
    pub jobs: Option<usize>,
}

impl Default for ScssConfig {
    fn default() -> Self {
        Self {
            input_path: format!("meta:{}", keys::RELATIVE_FILE_PATH),
            include_paths: Vec::new(),
            source_comments: true,
            output_style: OutputStyle::default(),
            source_map: false,
            jobs: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    scss: ScssConfig,
}

impl ScssConfig {
    /// Parse the `[scss]` table of a TOML document.
    ///
    /// A document without a `[scss]` table yields the defaults. The result
    /// is validated before it is returned.
    pub fn from_toml_str(source: &str) -> Result<Self, ScssError> {
        let file: ConfigFile = toml::from_str(source)?;
        file.scss.validate()?;
        Ok(file.scss)
    }

    /// Check the settings that serde cannot express.
    pub fn validate(&self) -> Result<(), ScssError> {
        self.selector()?;
        if let Some(index) = self
            .include_paths
            .iter()
            .position(|p| p.as_os_str().is_empty())
        {
            return Err(ScssError::InvalidIncludePath { index });
        }
        if self.jobs == Some(0) {
            return Err(ScssError::InvalidJobs);
        }
        Ok(())
    }

    /// Parsed input path selector.
    pub fn selector(&self) -> Result<InputPathSelector, ScssError> {
        self.input_path.parse()
    }
}
