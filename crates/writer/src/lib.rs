//! Serializes a [`model::SourceModel`] into the XMI-like interchange document
//! read by the diagram tooling.

pub mod document;
pub mod escape;
pub mod naming;
pub mod stream;

pub use document::{render, write_document, FIRST_RELATION_ID};
pub use escape::{escape_name, escape_text};
pub use naming::{dups_file_name, output_file_name};
pub use stream::{doc_id, encode_params, encode_statements, FIRST_TYPE_ID};
