//! IR-Tree representation of a resolved compilation unit.
//!
//! Every node carries a tagged [`NodeKind`], the raw source text it covers and
//! an optional [`Field`] naming the slot it occupies in its parent. Node ids are
//! unique within one tree and are the key a [`SymbolResolver`](crate::SymbolResolver)
//! uses to answer questions about a node.

use serde::{Deserialize, Serialize};

/// Name of the method declaration lowered from a constructor. The model
/// uses the same name for synthesized constructors.
pub const CONSTRUCTOR: &str = "<init>";

/// Flavor of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassFlavor {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    CompilationUnit,
    Package,
    Import,
    /// Type declaration. Anonymous class bodies use an empty name.
    ClassDecl {
        name: String,
        flavor: ClassFlavor,
    },
    /// Method or constructor declaration. Constructors are named `<init>`.
    MethodDecl {
        name: String,
    },
    /// Field, parameter or local variable declaration.
    Variable {
        name: String,
    },
    Block,
    If,
    ForLoop,
    EnhancedForLoop,
    WhileLoop,
    DoWhileLoop,
    Switch,
    /// One case label. `label` is `None` for `default`. `rule` marks the
    /// arrow form, which never falls through.
    Case {
        label: Option<String>,
        has_body: bool,
        rule: bool,
    },
    Break,
    Return,
    NewClass,
    /// Method call; `select` is the callee text as written (`a.b.run`).
    MethodInvocation {
        select: String,
    },
    Identifier {
        name: String,
        type_position: bool,
    },
    ParameterizedType,
    MemberSelect,
    Lambda,
    This,
    Super,
    /// Anything the walker has no dedicated handling for; carries the
    /// front-end's own kind name.
    Other(String),
}

/// Slot a child occupies within its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Extends,
    Implements,
    Member,
    Type,
    ReturnType,
    Parameter,
    Body,
    Condition,
    Variable,
    Expression,
    Identifier,
    Object,
    Name,
    Argument,
    Init,
    Label,
    Alternative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxNode {
    /// Unique identifier of the node within its tree.
    pub id: usize,
    pub kind: NodeKind,
    /// Role of this node inside its parent, if the front-end named one.
    pub field: Option<Field>,
    /// Source text covered by the node.
    pub text: String,
    /// 1-based line of the first character.
    pub line: usize,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(id: usize, kind: NodeKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            id,
            kind,
            field: None,
            text: text.into(),
            line,
            children: Vec::new(),
        }
    }

    /// Sets the role of this node and returns it.
    pub fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }

    pub fn push(&mut self, child: SyntaxNode) {
        self.children.push(child);
    }

    /// First child occupying `field`.
    pub fn child(&self, field: Field) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.field == Some(field))
    }

    /// All children occupying `field`, in source order.
    pub fn children_with(&self, field: Field) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.field == Some(field))
    }

    /// Name carried by declaration and identifier kinds.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::ClassDecl { name, .. }
            | NodeKind::MethodDecl { name }
            | NodeKind::Variable { name }
            | NodeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(SyntaxNode::size).sum::<usize>()
    }
}

/// A lowered compilation unit ready for model building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTree {
    pub file_path: String,
    pub root: SyntaxNode,
}

impl SourceTree {
    pub fn new(file_path: String, root: SyntaxNode) -> Self {
        Self { file_path, root }
    }

    /// Exports the tree to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
