//! Main types for the **IR-Tree** and the symbol resolution contract.
//!
//! A front-end lowers one source file into a [`SourceTree`] of
//! [`SyntaxNode`]s tagged by [`NodeKind`] and answers symbol questions
//! about those nodes through [`SymbolResolver`]. The model builder consumes
//! both without knowing which front-end produced them.

pub mod symbols;
pub mod tree;

pub use symbols::{Element, Scope, Symbol, SymbolKind, SymbolResolver};
pub use tree::{ClassFlavor, Field, NodeKind, SourceTree, SyntaxNode, CONSTRUCTOR};

#[cfg(test)]
mod tests;
