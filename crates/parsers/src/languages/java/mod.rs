use anyhow::{anyhow, Context, Result};
use ir::SourceTree;

mod lower;
mod names;
mod resolver;

pub use names::erase;
pub use resolver::JavaResolver;

#[cfg(test)]
mod tests;

/// A Java compilation unit lowered to the IR tree.
#[derive(Debug, Clone)]
pub struct ParsedJava {
    pub tree: SourceTree,
    /// Last line of the final top-level declaration.
    pub line_count: usize,
    /// Whether tree-sitter had to recover from syntax errors.
    pub has_errors: bool,
}

impl ParsedJava {
    /// Builds the resolver for this unit, seeing `context` units' classes.
    pub fn resolve(&self, context: &[SourceTree]) -> JavaResolver {
        JavaResolver::build(&self.tree, self.line_count, context)
    }
}

/// Parses Java source text. Syntax errors are tolerated: the recovered tree
/// is lowered with error regions kept as opaque nodes.
pub fn parse_java(content: &str, file_path: &str) -> Result<ParsedJava> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(tree_sitter_java::language())
        .context("load java grammar")?;
    let tree = parser
        .parse(content, None)
        .ok_or_else(|| anyhow!("failed to parse java source: {file_path}"))?;
    let root = tree.root_node();
    let has_errors = root.has_error();
    if has_errors {
        tracing::warn!("java source contains parse errors: {}", file_path);
    }
    let unit = lower::Lowerer::new(content).lower_program(root);
    Ok(ParsedJava {
        tree: SourceTree::new(file_path.to_string(), unit),
        line_count: lower::line_count(root),
        has_errors,
    })
}
