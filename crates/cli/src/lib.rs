//! Command-line front of javamodel: argument parsing, user configuration and
//! the single-file analysis pipeline.

pub mod analyze;
pub mod args;
pub mod config;

/// Extension of the documents written to the output directory.
pub const DEFAULT_EXTENSION: &str = "xmi";

/// Directory, beside the output directory, receiving duplicate-hash files.
pub const DEFAULT_DUPS_DIR: &str = "dups";
