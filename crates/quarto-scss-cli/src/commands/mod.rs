//! Command implementations for the quarto-scss CLI
//!
//! Commands handle argument plumbing and file I/O, and delegate
//! compilation to quarto-scss.

pub mod build;
