//! Java front-end for javamodel.
//!
//! Source files are parsed with tree-sitter, lowered into the [`ir`] tree and
//! paired with a best-effort [`ir::SymbolResolver`]. Context files given next
//! to the analyzed file only contribute their declared classes.

use anyhow::{Context, Result};
use ir::SourceTree;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub mod dup_hash;
pub mod languages;
pub use languages::*;

#[derive(Debug, Default, Serialize)]
pub struct ParserMetrics {
    pub files_parsed: usize,
    pub context_files: usize,
    pub parse_errors: usize,
}

/// A parsed source file with everything the model builder needs.
#[derive(Debug, Clone)]
pub struct JavaUnit {
    /// Raw source text.
    pub source: String,
    pub tree: SourceTree,
    pub resolver: JavaResolver,
}

impl JavaUnit {
    /// Canonical path of the analyzed file.
    pub fn path(&self) -> &str {
        &self.tree.file_path
    }
}

/// Canonical absolute form of `path`, or `path` itself when it cannot be
/// resolved.
pub fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Reads and parses one Java file into its IR tree.
pub fn parse_file(path: &Path, metrics: Option<&mut ParserMetrics>) -> Result<(String, ParsedJava)> {
    let path = canonical(path);
    debug!(file = %path.display(), "Parsing file");
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let parsed = parse_java(&content, &path.to_string_lossy())?;
    if let Some(m) = metrics {
        m.files_parsed += 1;
        if parsed.has_errors {
            m.parse_errors += 1;
        }
    }
    Ok((content, parsed))
}

/// Parses `path` and resolves it against the classes declared in `context`.
/// Unreadable context files are skipped with a warning.
pub fn analyze_file(
    path: &Path,
    context: &[PathBuf],
    mut metrics: Option<&mut ParserMetrics>,
) -> Result<JavaUnit> {
    let (source, parsed) = parse_file(path, metrics.as_deref_mut())?;
    let mut context_trees = Vec::with_capacity(context.len());
    for extra in context {
        match parse_file(extra, metrics.as_deref_mut()) {
            Ok((_, unit)) => context_trees.push(unit.tree),
            Err(e) => warn!(file = %extra.display(), error = %e, "skipping context file"),
        }
    }
    if let Some(m) = metrics {
        m.context_files += context_trees.len();
    }
    let resolver = parsed.resolve(&context_trees);
    debug!(
        file = %parsed.tree.file_path,
        nodes = parsed.tree.root.size(),
        symbols = resolver.symbol_count(),
        "Java file analyzed"
    );
    Ok(JavaUnit {
        source,
        tree: parsed.tree,
        resolver,
    })
}
