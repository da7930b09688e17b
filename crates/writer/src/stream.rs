//! Statement stream encoding.
//!
//! One method's statements become a single `#`-separated line:
//!
//! ```text
//! {[x&gt;0]#c=helper@10#v=count@10@12@t#}
//! ```

use model::{Statement, TypeId, TypeRef};

use crate::escape::escape_text;

/// Document id of the first type; lower ids are reserved for the module.
pub const FIRST_TYPE_ID: usize = 10;

/// Document id assigned to a registry type.
pub fn doc_id(ty: TypeId) -> usize {
    FIRST_TYPE_ID + ty.0
}

pub fn encode_statement(stmt: &Statement) -> String {
    match stmt {
        Statement::OpenScope { condition } => format!("{{{}", escape_text(condition)),
        Statement::CloseScope => "}".to_string(),
        Statement::Call { name, target } => {
            format!("c={}@{}", escape_text(name), doc_id(*target))
        }
        Statement::VarRef {
            name,
            class,
            var_type,
        } => format!(
            "v={}@{}@{}@t",
            escape_text(name),
            doc_id(*class),
            doc_id(*var_type)
        ),
    }
}

pub fn encode_statements(stmts: &[Statement]) -> String {
    stmts
        .iter()
        .map(encode_statement)
        .collect::<Vec<_>>()
        .join("#")
}

/// Parameter list line. The two trailing flags are always false.
pub fn encode_params(params: &[TypeRef]) -> String {
    params
        .iter()
        .map(|p| format!("{}@{}@f@f", p.name, doc_id(p.ty)))
        .collect::<Vec<_>>()
        .join("#")
}
