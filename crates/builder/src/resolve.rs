//! Type name resolution policy.
//!
//! Each helper answers `None` when no type is known; callers treat that as
//! "skip this statement or relation", never as a failure.

use ir::{Field, NodeKind, SymbolKind, SymbolResolver, SyntaxNode};

/// Qualified type name associated with `node`, chosen by node kind.
pub fn type_name<R>(resolver: &R, node: &SyntaxNode, package: &str) -> Option<String>
where
    R: SymbolResolver + ?Sized,
{
    match &node.kind {
        NodeKind::ParameterizedType => resolver.symbol(node)?.qualified_name,
        // the invoked type, not the type of the call expression
        NodeKind::MethodInvocation { .. } => resolver.symbol(node)?.enclosing_type,
        NodeKind::NewClass => identifier_type_name(resolver, node.child(Field::Identifier)?),
        NodeKind::ClassDecl { name, .. } => class_name(package, name),
        NodeKind::Identifier { .. } => identifier_type_name(resolver, node),
        _ => None,
    }
}

/// Declared type of an identifier-like node.
pub fn identifier_type_name<R>(resolver: &R, node: &SyntaxNode) -> Option<String>
where
    R: SymbolResolver + ?Sized,
{
    let Some(symbol) = resolver.symbol(node) else {
        return scope_lookup(resolver, node);
    };
    match symbol.kind {
        kind if kind.is_type() => symbol.qualified_name,
        SymbolKind::Package
        | SymbolKind::Method
        | SymbolKind::Constructor
        | SymbolKind::EnumConstant
        | SymbolKind::AnnotationType => None,
        // A local's qualified name is its own simple name.
        SymbolKind::LocalVariable => symbol.qualified_name,
        _ => scope_lookup(resolver, node),
    }
}

/// Searches the locals, then the members of the enclosing class, for an
/// element spelled like `node`. First match wins.
pub fn scope_lookup<R>(resolver: &R, node: &SyntaxNode) -> Option<String>
where
    R: SymbolResolver + ?Sized,
{
    let scope = resolver.scope(node)?;
    let wanted = node.name().unwrap_or(node.text.as_str());
    scope
        .locals
        .iter()
        .chain(scope.members.iter())
        .find(|e| e.name == wanted)
        .map(|e| e.type_name.clone())
}

/// Class enclosing the declaration a variable reference points at. Only
/// parameters, locals and fields have one.
pub fn enclosing_type<R>(resolver: &R, node: &SyntaxNode) -> Option<String>
where
    R: SymbolResolver + ?Sized,
{
    resolver.scope(node)?.enclosing_class?;
    let symbol = resolver.symbol(node)?;
    if symbol.kind.is_variable() {
        symbol.enclosing_type
    } else {
        None
    }
}

fn class_name(package: &str, simple: &str) -> Option<String> {
    if simple.is_empty() {
        return None;
    }
    if package.is_empty() {
        Some(simple.to_string())
    } else {
        Some(format!("{package}.{simple}"))
    }
}
