//! Contract between the model builder and whatever front-end performed
//! semantic analysis of the source.
//!
//! Every query may come back empty. An empty answer means "no information
//! available" and callers branch on it; it is never an error.

use serde::{Deserialize, Serialize};

use crate::SyntaxNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Class,
    Interface,
    Enum,
    AnnotationType,
    EnumConstant,
    Package,
    Method,
    Constructor,
    Field,
    Parameter,
    LocalVariable,
    Other,
}

impl SymbolKind {
    /// Kinds naming a type.
    pub fn is_type(self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Interface | SymbolKind::Enum)
    }

    /// Kinds naming a variable slot (parameter, local or field).
    pub fn is_variable(self) -> bool {
        matches!(
            self,
            SymbolKind::Parameter | SymbolKind::LocalVariable | SymbolKind::Field
        )
    }
}

/// Symbol a node refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// Simple name as written.
    pub name: String,
    /// Qualified name as reported by the front-end, if any.
    pub qualified_name: Option<String>,
    /// Qualified name of the type that declares the symbol. For method
    /// invocations this is the invoked type.
    pub enclosing_type: Option<String>,
}

impl Symbol {
    pub fn new(kind: SymbolKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            qualified_name: None,
            enclosing_type: None,
        }
    }

    pub fn qualified(mut self, name: impl Into<String>) -> Self {
        self.qualified_name = Some(name.into());
        self
    }

    pub fn enclosed_by(mut self, ty: impl Into<String>) -> Self {
        self.enclosing_type = Some(ty.into());
        self
    }
}

/// Named element visible from a scope, with the textual form of its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub name: String,
    pub type_name: String,
}

impl Element {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Lexical scope at a reference site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    /// Innermost enclosing type, qualified.
    pub enclosing_class: Option<String>,
    /// Local elements (parameters and locals), innermost first.
    pub locals: Vec<Element>,
    /// Members of the enclosing class.
    pub members: Vec<Element>,
}

/// Symbol Resolution Facade.
pub trait SymbolResolver {
    /// Package of the compilation unit; empty for the default package.
    fn package_name(&self) -> &str;

    /// Total line count of the compilation unit.
    fn line_count(&self) -> usize;

    /// Symbol referenced or declared by `node`.
    fn symbol(&self, node: &SyntaxNode) -> Option<Symbol>;

    /// Scope in effect at `node`.
    fn scope(&self, node: &SyntaxNode) -> Option<Scope>;
}
