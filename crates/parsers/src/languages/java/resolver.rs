use ir::{Element, Field, NodeKind, Scope, SourceTree, Symbol, SymbolKind, SymbolResolver, SyntaxNode};
use std::collections::{HashMap, HashSet};
use std::iter;
use std::rc::Rc;

use super::names::{erase, FileNames, Qualifier};

const OBJECT: &str = "java.lang.Object";

/// Members of one declared class, with type texts already qualified.
#[derive(Debug, Clone, Default)]
struct ClassInfo {
    fields: Vec<(String, String)>,
    /// Method name → erased return type; `None` for constructors.
    methods: HashMap<String, Option<String>>,
    superclass: Option<String>,
}

/// Best-effort symbol information for one lowered Java file.
///
/// Types are known from the file itself and from any context files parsed
/// alongside it. Everything else is inferred from imports and the `java.lang`
/// defaults, so answers may be missing but never fail.
#[derive(Debug, Clone, Default)]
pub struct JavaResolver {
    package: String,
    line_count: usize,
    symbols: HashMap<usize, Symbol>,
    /// Identifiers seen under the same set of visible names share one snapshot.
    scopes: HashMap<usize, Rc<Scope>>,
}

impl JavaResolver {
    pub fn build(tree: &SourceTree, line_count: usize, context: &[SourceTree]) -> Self {
        let units: Vec<&SourceTree> = context.iter().chain(iter::once(tree)).collect();
        // the analyzed file wins over context files declaring the same name
        let mut declared = HashMap::new();
        for unit in &units {
            let names = FileNames::from_tree(&unit.root);
            collect_declared(&unit.root, &names, &mut declared);
        }
        let mut classes = HashMap::new();
        for unit in &units {
            let names = FileNames::from_tree(&unit.root);
            let q = Qualifier {
                names: &names,
                declared: &declared,
            };
            collect_classes(&unit.root, q, &mut classes);
        }

        let names = FileNames::from_tree(&tree.root);
        let mut walker = Walker {
            q: Qualifier {
                names: &names,
                declared: &declared,
            },
            classes: &classes,
            class_stack: Vec::new(),
            scopes: Vec::new(),
            symbols: HashMap::new(),
            scope_at: HashMap::new(),
            snapshot: None,
        };
        walker.visit(&tree.root);
        let Walker {
            symbols, scope_at, ..
        } = walker;
        tracing::debug!(
            file = %tree.file_path,
            symbols = symbols.len(),
            classes = classes.len(),
            "java symbols resolved"
        );
        Self {
            package: names.package.clone(),
            line_count,
            symbols,
            scopes: scope_at,
        }
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Number of distinct scope snapshots recorded for this file.
    pub fn scope_count(&self) -> usize {
        self.scopes
            .values()
            .map(Rc::as_ptr)
            .collect::<HashSet<_>>()
            .len()
    }
}

impl SymbolResolver for JavaResolver {
    fn package_name(&self) -> &str {
        &self.package
    }

    fn line_count(&self) -> usize {
        self.line_count
    }

    fn symbol(&self, node: &SyntaxNode) -> Option<Symbol> {
        self.symbols.get(&node.id).cloned()
    }

    fn scope(&self, node: &SyntaxNode) -> Option<Scope> {
        self.scopes.get(&node.id).map(|scope| Scope::clone(scope))
    }
}

fn collect_declared(node: &SyntaxNode, names: &FileNames, out: &mut HashMap<String, String>) {
    if let NodeKind::ClassDecl { name, .. } = &node.kind {
        if !name.is_empty() {
            out.insert(name.clone(), names.in_package(name));
        }
    }
    for child in &node.children {
        collect_declared(child, names, out);
    }
}

fn collect_classes(node: &SyntaxNode, q: Qualifier, out: &mut HashMap<String, ClassInfo>) {
    if let NodeKind::ClassDecl { name, .. } = &node.kind {
        if !name.is_empty() {
            let mut info = ClassInfo::default();
            for member in &node.children {
                match (&member.kind, member.field) {
                    (NodeKind::Variable { name }, Some(Field::Member)) => {
                        let ty = member
                            .child(Field::Type)
                            .map(|t| q.qualify_text(&t.text))
                            .unwrap_or_else(|| OBJECT.to_string());
                        info.fields.push((name.clone(), ty));
                    }
                    (NodeKind::MethodDecl { name }, _) => {
                        let ret = member
                            .child(Field::ReturnType)
                            .map(|t| q.qualify(&t.text));
                        info.methods.entry(name.clone()).or_insert(ret);
                    }
                    (_, Some(Field::Extends)) if info.superclass.is_none() => {
                        info.superclass = Some(q.qualify(&member.text));
                    }
                    _ => {}
                }
            }
            out.insert(q.names.in_package(name), info);
        }
    }
    for child in &node.children {
        collect_classes(child, q, out);
    }
}

#[derive(Debug, Clone)]
struct Local {
    name: String,
    type_text: String,
    kind: SymbolKind,
}

/// Walks the analyzed file keeping the class nesting and lexical scopes,
/// recording a symbol and scope for each node the model builder asks about.
struct Walker<'a> {
    q: Qualifier<'a>,
    classes: &'a HashMap<String, ClassInfo>,
    class_stack: Vec<String>,
    scopes: Vec<Vec<Local>>,
    symbols: HashMap<usize, Symbol>,
    scope_at: HashMap<usize, Rc<Scope>>,
    /// Scope as of the last identifier, dropped whenever visible names change.
    snapshot: Option<Rc<Scope>>,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, node: &SyntaxNode) {
        match &node.kind {
            NodeKind::ClassDecl { name, .. } if !name.is_empty() => {
                self.class_stack.push(self.q.names.in_package(name));
                self.snapshot = None;
                self.visit_children(node);
                self.class_stack.pop();
                self.snapshot = None;
            }
            NodeKind::MethodDecl { .. }
            | NodeKind::Block
            | NodeKind::ForLoop
            | NodeKind::EnhancedForLoop
            | NodeKind::Lambda
            | NodeKind::Switch => self.scoped(node),
            NodeKind::Other(kind)
                if kind == "catch_clause" || kind == "try_with_resources_statement" =>
            {
                self.scoped(node)
            }
            NodeKind::Variable { name } => {
                self.visit_children(node);
                match node.field {
                    Some(Field::Member) => {}
                    Some(Field::Parameter) => self.declare(name, node, SymbolKind::Parameter),
                    _ => self.declare(name, node, SymbolKind::LocalVariable),
                }
            }
            NodeKind::Identifier {
                name,
                type_position,
            } => self.resolve_identifier(node, name, *type_position),
            NodeKind::ParameterizedType => {
                let symbol = Symbol::new(SymbolKind::Class, erase(&node.text))
                    .qualified(self.q.qualify(&node.text));
                self.symbols.insert(node.id, symbol);
                self.visit_children(node);
            }
            NodeKind::MethodInvocation { select } => {
                let name = method_name(node, select).to_string();
                let mut symbol = Symbol::new(SymbolKind::Method, name.clone());
                if let Some(owner) = self.invocation_owner(node, select) {
                    symbol = symbol.enclosed_by(owner);
                }
                self.symbols.insert(node.id, symbol);
                for child in &node.children {
                    if child.field == Some(Field::Name) {
                        self.symbols
                            .insert(child.id, Symbol::new(SymbolKind::Method, name.clone()));
                    } else {
                        self.visit(child);
                    }
                }
            }
            NodeKind::NewClass => {
                if let Some(ty) = node.child(Field::Identifier) {
                    if ty.kind == NodeKind::MemberSelect {
                        let text: String = erase(&ty.text).split_whitespace().collect();
                        let symbol = Symbol::new(SymbolKind::Class, text.clone()).qualified(text);
                        self.symbols.insert(ty.id, symbol);
                    }
                }
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &SyntaxNode) {
        for child in &node.children {
            self.visit(child);
        }
    }

    fn scoped(&mut self, node: &SyntaxNode) {
        self.scopes.push(Vec::new());
        self.visit_children(node);
        if self.scopes.pop().is_some_and(|frame| !frame.is_empty()) {
            self.snapshot = None;
        }
    }

    fn declare(&mut self, name: &str, node: &SyntaxNode, kind: SymbolKind) {
        let type_text = match node.child(Field::Type) {
            Some(t) if t.text.trim() == "var" => node
                .child(Field::Init)
                .and_then(|init| self.expr_type(init))
                .unwrap_or_else(|| OBJECT.to_string()),
            Some(t) => self.q.qualify_text(&t.text),
            None => OBJECT.to_string(),
        };
        if let Some(scope) = self.scopes.last_mut() {
            scope.push(Local {
                name: name.to_string(),
                type_text,
                kind,
            });
            self.snapshot = None;
        }
    }

    fn resolve_identifier(&mut self, node: &SyntaxNode, name: &str, type_position: bool) {
        if type_position {
            let symbol = Symbol::new(SymbolKind::Class, name).qualified(self.q.qualify(name));
            self.symbols.insert(node.id, symbol);
            return;
        }
        let current = self.class_stack.last().cloned();
        let symbol = if let Some(local) = self.lookup_local(name) {
            let mut symbol = Symbol::new(local.kind, name);
            if local.kind == SymbolKind::LocalVariable {
                symbol = symbol.qualified(name);
            }
            match current {
                Some(class) => Some(symbol.enclosed_by(class)),
                None => Some(symbol),
            }
        } else if let Some((owner, _)) = self.lookup_field(name) {
            Some(Symbol::new(SymbolKind::Field, name).qualified(name).enclosed_by(owner))
        } else if self.looks_like_type(name) {
            Some(Symbol::new(SymbolKind::Class, name).qualified(self.q.qualify(name)))
        } else if is_constant_case(name) {
            Some(Symbol::new(SymbolKind::EnumConstant, name))
        } else {
            None
        };
        if let Some(symbol) = symbol {
            self.symbols.insert(node.id, symbol);
        }
        let scope = match &self.snapshot {
            Some(scope) => Rc::clone(scope),
            None => {
                let scope = Rc::new(self.current_scope());
                self.snapshot = Some(Rc::clone(&scope));
                scope
            }
        };
        self.scope_at.insert(node.id, scope);
    }

    fn looks_like_type(&self, name: &str) -> bool {
        self.q.knows(name) || (starts_upper(name) && !is_constant_case(name))
    }

    fn current_scope(&self) -> Scope {
        let enclosing_class = self.class_stack.last().cloned();
        let locals = self
            .scopes
            .iter()
            .rev()
            .flat_map(|s| s.iter().rev())
            .map(|l| Element::new(&l.name, &l.type_text))
            .collect();
        let members = self
            .class_stack
            .iter()
            .rev()
            .flat_map(|class| self.chain(class))
            .filter_map(|c| self.classes.get(&c))
            .flat_map(|info| info.fields.iter())
            .map(|(name, ty)| Element::new(name, ty))
            .collect();
        Scope {
            enclosing_class,
            locals,
            members,
        }
    }

    fn lookup_local(&self, name: &str) -> Option<&Local> {
        self.scopes
            .iter()
            .rev()
            .flat_map(|s| s.iter().rev())
            .find(|l| l.name == name)
    }

    /// Field visible by simple name: enclosing classes innermost first, each
    /// with its known superclasses. Returns `(owner, type)`.
    fn lookup_field(&self, name: &str) -> Option<(String, String)> {
        self.class_stack.iter().rev().find_map(|class| {
            self.chain(class).into_iter().find_map(|c| {
                let info = self.classes.get(&c)?;
                let (_, ty) = info.fields.iter().find(|(n, _)| n == name)?;
                Some((c, ty.clone()))
            })
        })
    }

    fn field_type(&self, owner: &str, name: &str) -> Option<String> {
        self.chain(owner).into_iter().find_map(|c| {
            let info = self.classes.get(&c)?;
            info.fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, ty)| erase(ty).to_string())
        })
    }

    /// `class` followed by its known superclasses.
    fn chain(&self, class: &str) -> Vec<String> {
        let mut out = vec![class.to_string()];
        let mut seen = HashSet::new();
        seen.insert(class.to_string());
        let mut cur = class.to_string();
        while let Some(parent) = self.classes.get(&cur).and_then(|i| i.superclass.clone()) {
            if !seen.insert(parent.clone()) {
                break;
            }
            out.push(parent.clone());
            cur = parent;
        }
        out
    }

    fn superclass_of(&self, class: &str) -> String {
        self.classes
            .get(class)
            .and_then(|i| i.superclass.clone())
            .unwrap_or_else(|| OBJECT.to_string())
    }

    /// Type whose method a call invokes.
    fn invocation_owner(&self, node: &SyntaxNode, select: &str) -> Option<String> {
        if let Some(object) = node.child(Field::Object) {
            return self.expr_type(object);
        }
        let current = self.class_stack.last()?;
        match select.trim() {
            "this" => return Some(current.clone()),
            "super" => return Some(self.superclass_of(current)),
            _ => {}
        }
        let name = method_name(node, select);
        let declared = self.class_stack.iter().rev().find_map(|class| {
            self.chain(class).into_iter().find(|c| {
                self.classes
                    .get(c)
                    .is_some_and(|info| info.methods.contains_key(name))
            })
        });
        // inherited from a type we have not seen
        declared.or_else(|| {
            Some(
                self.classes
                    .get(current)
                    .and_then(|i| i.superclass.clone())
                    .unwrap_or_else(|| current.clone()),
            )
        })
    }

    /// Erased static type of an expression, when it can be told.
    fn expr_type(&self, node: &SyntaxNode) -> Option<String> {
        match &node.kind {
            NodeKind::Identifier {
                name,
                type_position: true,
            } => Some(self.q.qualify(name)),
            NodeKind::Identifier { name, .. } => {
                if let Some(local) = self.lookup_local(name) {
                    Some(erase(&local.type_text).to_string())
                } else if let Some((_, ty)) = self.lookup_field(name) {
                    Some(erase(&ty).to_string())
                } else if self.looks_like_type(name) {
                    Some(self.q.qualify(name))
                } else {
                    None
                }
            }
            NodeKind::This => self.class_stack.last().cloned(),
            NodeKind::Super => self.class_stack.last().map(|c| self.superclass_of(c)),
            NodeKind::MethodInvocation { select } => {
                let owner = self.invocation_owner(node, select)?;
                let name = method_name(node, select);
                self.chain(&owner).into_iter().find_map(|c| {
                    self.classes
                        .get(&c)?
                        .methods
                        .get(name)
                        .cloned()
                        .flatten()
                })
            }
            NodeKind::NewClass => node
                .child(Field::Identifier)
                .map(|t| self.q.qualify(&t.text.split_whitespace().collect::<String>())),
            NodeKind::MemberSelect => {
                let text: String = erase(&node.text).split_whitespace().collect();
                let member = text.rsplit('.').next()?;
                let owner = node.child(Field::Object).and_then(|o| self.expr_type(o));
                if let Some(ty) = owner.and_then(|o| self.field_type(&o, member)) {
                    return Some(ty);
                }
                starts_upper(member).then_some(text.clone())
            }
            NodeKind::Other(kind) => match kind.as_str() {
                "string_literal" | "text_block" => Some("java.lang.String".to_string()),
                "parenthesized_expression" => node.children.first().and_then(|c| self.expr_type(c)),
                "cast_expression" => node.children.first().map(|t| self.q.qualify(&t.text)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Method name of a call: the last segment of its select text.
fn method_name<'n>(node: &'n SyntaxNode, select: &'n str) -> &'n str {
    node.child(Field::Name)
        .and_then(SyntaxNode::name)
        .unwrap_or_else(|| select.rsplit('.').next().unwrap_or(select).trim())
}

fn starts_upper(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// `MAX_SIZE`, `RED`: constants rather than types.
fn is_constant_case(name: &str) -> bool {
    name.len() > 1
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
