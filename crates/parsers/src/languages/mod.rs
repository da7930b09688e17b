//! Source language front-ends.
//!
//! Each front-end lowers its concrete syntax into the shared [`ir`] tree and
//! provides a [`ir::SymbolResolver`] over it. Java is the only language the
//! model builder understands today.

pub mod java;
pub use java::{parse_java, JavaResolver, ParsedJava};
