use anyhow::{Context, Result};
use model::{SourceModel, TypeId};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::escape::escape_name;
use crate::stream::{doc_id, encode_params, encode_statements};

/// First id handed to a generalization element. Ids keep counting across
/// classes, so every `Genrl` id in one document is distinct; they do not
/// restart at this value for each class.
pub const FIRST_RELATION_ID: usize = 100_000;

/// Writes the interchange document for `model` to `out`.
///
/// Every type gets a `Class` element in registry order. Only types declared in
/// the module carry nested attributes and operations; relations follow their
/// owning class as sibling `Genrl` elements.
pub fn render<W: Write>(out: &mut W, model: &SourceModel) -> io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<XMI xmi.version="1.2" xmlns:UML="http://schema.omg.org/spec/UML/1.3" >"#
    )?;
    writeln!(out, " <XMI.content>")?;
    writeln!(
        out,
        r#"  <Module id="1" module="{}" moduleLines="{}" />"#,
        model.module.path.replace('\\', "/"),
        model.module.line_count
    )?;

    let mut relation_id = FIRST_RELATION_ID;
    for (id, ty) in model.types() {
        write_class(out, model, id)?;
        for rel in &ty.relations {
            writeln!(
                out,
                r#"  <Genrl id="{}" child="{}" parent="{}" />"#,
                relation_id,
                doc_id(id),
                doc_id(rel.target)
            )?;
            relation_id += 1;
        }
    }

    writeln!(out, " </XMI.content>")?;
    writeln!(out, "</XMI>")
}

fn write_class<W: Write>(out: &mut W, model: &SourceModel, id: TypeId) -> io::Result<()> {
    let ty = model.ty(id);
    let name = escape_name(&ty.name);
    if !ty.module_defined {
        return writeln!(out, r#"  <Class id="{}" name="{}" />"#, doc_id(id), name);
    }
    writeln!(
        out,
        r#"  <Class id="{}" name="{}" module="1" line="1" >"#,
        doc_id(id),
        name
    )?;
    for member in &ty.member_vars {
        writeln!(
            out,
            r#"   <Attr name="{}" type="{}" />"#,
            member.name,
            doc_id(member.ty)
        )?;
    }
    for method in model.methods_of(id) {
        writeln!(
            out,
            r#"   <Oper name="{}" const="f" virt="f" line="1" retconst="f" retref="f" >"#,
            escape_name(&method.name)
        )?;
        if !method.params.is_empty() {
            writeln!(out, r#"    <Parms list="{}" />"#, encode_params(&method.params))?;
        }
        writeln!(
            out,
            r#"    <Statements list="{}" />"#,
            encode_statements(&method.statements)
        )?;
        writeln!(out, "   </Oper>")?;
    }
    writeln!(out, "  </Class>")
}

/// Renders the document into `path`, creating parent directories.
pub fn write_document(model: &SourceModel, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    render(&mut out, model).with_context(|| format!("failed to write {}", path.display()))?;
    out.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(file = %path.display(), types = model.type_count(), "document written");
    Ok(())
}
