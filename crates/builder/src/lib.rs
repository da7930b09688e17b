//! Model builder: a single pass over a resolved [`SourceTree`] that fills a
//! [`SourceModel`].
//!
//! Dispatch is one `match` on [`NodeKind`]. Nodes without dedicated handling
//! are descended into. Statements are only recorded while a method of a named
//! type is open; constructs outside a method only register types.

pub mod resolve;
pub mod switch;

use ir::{Field, NodeKind, SourceTree, SymbolResolver, SyntaxNode};
use model::{MethodId, Module, Origin, RelationKind, SourceModel, Statement, TypeId, TypeRef};
use tracing::{debug, trace};

use switch::{CaseExit, ScopeAction, SwitchContext};

/// Label used for the `default` case.
pub const DEFAULT_LABEL: &str = "[default]";

/// Builds the model for one compilation unit.
pub fn build_model<R>(tree: &SourceTree, resolver: &R, module_path: &str) -> SourceModel
where
    R: SymbolResolver + ?Sized,
{
    let module = Module::new(module_path, resolver.package_name(), resolver.line_count());
    let mut builder = ModelBuilder::new(resolver, SourceModel::new(module));
    builder.walk(&tree.root);
    let model = builder.finish();
    debug!(
        file = %tree.file_path,
        types = model.type_count(),
        imports = model.module.imports.len(),
        "model built"
    );
    model
}

/// Per-body walker state. Saved and reset when entering a method, a lambda
/// or a class body so that nested bodies never touch the enclosing switch.
#[derive(Default)]
struct Frame {
    switches: Vec<SwitchContext>,
    depth: usize,
    loop_depth: usize,
    argument_depth: usize,
    open_scopes: usize,
}

pub struct ModelBuilder<'a, R: SymbolResolver + ?Sized> {
    resolver: &'a R,
    model: SourceModel,
    current_class: Option<TypeId>,
    current_method: Option<MethodId>,
    anonymous_depth: usize,
    frame: Frame,
}

impl<'a, R: SymbolResolver + ?Sized> ModelBuilder<'a, R> {
    pub fn new(resolver: &'a R, model: SourceModel) -> Self {
        Self {
            resolver,
            model,
            current_class: None,
            current_method: None,
            anonymous_depth: 0,
            frame: Frame::default(),
        }
    }

    pub fn finish(self) -> SourceModel {
        self.model
    }

    pub fn walk(&mut self, node: &SyntaxNode) {
        match &node.kind {
            NodeKind::Import => self.visit_import(node),
            NodeKind::Package => {}
            NodeKind::ClassDecl { .. } => self.visit_class(node),
            NodeKind::MethodDecl { name } => self.visit_method(node, name),
            NodeKind::If => {
                let label = format!("[{}]", text_of(node, Field::Condition));
                self.visit_scoped(node, label, false);
            }
            NodeKind::ForLoop | NodeKind::WhileLoop | NodeKind::DoWhileLoop => {
                let label = format!("*[{}]", text_of(node, Field::Condition));
                self.visit_scoped(node, label, true);
            }
            NodeKind::EnhancedForLoop => {
                let label = format!(
                    "*[{} : {}]",
                    text_of(node, Field::Variable),
                    text_of(node, Field::Expression)
                );
                self.visit_scoped(node, label, true);
            }
            NodeKind::Switch => self.visit_switch(node),
            NodeKind::Case { label, has_body, rule } => {
                self.visit_case(node, label.as_deref(), *has_body, *rule)
            }
            NodeKind::Break => self.exit_case(true),
            NodeKind::Return => {
                self.walk_children(node);
                self.exit_case(false);
            }
            NodeKind::NewClass => self.visit_new_class(node),
            NodeKind::MethodInvocation { select } => self.visit_invocation(node, select),
            NodeKind::Identifier { name, .. } => self.visit_identifier(node, name),
            NodeKind::Lambda => {
                let saved = std::mem::take(&mut self.frame);
                self.walk_children(node);
                self.close_open_scopes();
                self.frame = saved;
            }
            _ => self.walk_children(node),
        }
    }

    fn walk_children(&mut self, node: &SyntaxNode) {
        for child in &node.children {
            if child.field == Some(Field::Argument) {
                self.frame.argument_depth += 1;
                self.walk(child);
                self.frame.argument_depth -= 1;
            } else {
                self.walk(child);
            }
        }
    }

    fn visit_import(&mut self, node: &SyntaxNode) {
        self.model.module.imports.push(node.text.trim().to_string());
    }

    fn visit_class(&mut self, node: &SyntaxNode) {
        let Some(name) = self.type_name(node) else {
            // Anonymous body: its statements belong to the enclosing method.
            let saved = std::mem::take(&mut self.frame);
            self.anonymous_depth += 1;
            self.walk_children(node);
            self.anonymous_depth -= 1;
            self.close_open_scopes();
            self.frame = saved;
            return;
        };
        let ty = self.model.define_type(&name);
        trace!(class = %name, line = node.line, "type declared");

        for parent in node.children_with(Field::Extends) {
            self.add_relation(ty, parent, RelationKind::Extends);
        }
        for parent in node.children_with(Field::Implements) {
            self.add_relation(ty, parent, RelationKind::Implements);
        }
        for member in node.children_with(Field::Member) {
            if let Some(type_ref) = self.type_ref(member) {
                self.model.add_member(ty, &type_ref.name, type_ref.ty);
            }
        }

        let saved_class = self.current_class.replace(ty);
        let saved_method = self.current_method.take();
        let saved_anonymous = std::mem::take(&mut self.anonymous_depth);
        let saved_frame = std::mem::take(&mut self.frame);
        self.walk_children(node);
        self.frame = saved_frame;
        self.anonymous_depth = saved_anonymous;
        self.current_method = saved_method;
        self.current_class = saved_class;
    }

    fn visit_method(&mut self, node: &SyntaxNode, name: &str) {
        let Some(owner) = self.current_class.filter(|_| self.anonymous_depth == 0) else {
            let saved = std::mem::take(&mut self.frame);
            self.walk_children(node);
            self.close_open_scopes();
            self.frame = saved;
            return;
        };
        let params: Vec<TypeRef> = node
            .children_with(Field::Parameter)
            .filter_map(|p| self.type_ref(p))
            .collect();
        let method = self
            .model
            .add_method(owner, name, params, Origin::Node(node.id));

        let saved_method = self.current_method.replace(method);
        let saved_frame = std::mem::take(&mut self.frame);
        self.walk_children(node);
        self.close_open_scopes();
        self.frame = saved_frame;
        self.current_method = saved_method;
    }

    fn visit_scoped(&mut self, node: &SyntaxNode, label: String, is_loop: bool) {
        self.open_scope(label);
        self.frame.depth += 1;
        if is_loop {
            self.frame.loop_depth += 1;
        }
        self.walk_children(node);
        if is_loop {
            self.frame.loop_depth -= 1;
        }
        self.frame.depth -= 1;
        self.close_scope();
    }

    fn visit_switch(&mut self, node: &SyntaxNode) {
        let expr = text_of(node, Field::Condition);
        let ctx = SwitchContext::new(expr, self.frame.loop_depth, self.frame.depth);
        self.frame.switches.push(ctx);
        self.walk_children(node);
        if let Some(mut ctx) = self.frame.switches.pop() {
            if let Some(action) = ctx.end_case() {
                self.apply(action);
            }
        }
    }

    fn visit_case(&mut self, node: &SyntaxNode, label: Option<&str>, has_body: bool, rule: bool) {
        let label = label.unwrap_or(DEFAULT_LABEL);
        let actions = match self.frame.switches.last_mut() {
            Some(ctx) => ctx.start_case(label, has_body),
            None => Vec::new(),
        };
        for action in actions {
            self.apply(action);
        }
        self.walk_children(node);
        if rule {
            let action = self.frame.switches.last_mut().and_then(SwitchContext::end_case);
            if let Some(action) = action {
                self.apply(action);
            }
        }
    }

    fn exit_case(&mut self, is_break: bool) {
        let (depth, loop_depth) = (self.frame.depth, self.frame.loop_depth);
        let Some(ctx) = self.frame.switches.last_mut() else {
            return;
        };
        let action = match ctx.exit_at(depth, loop_depth, is_break) {
            CaseExit::Now => ctx.end_case(),
            CaseExit::Deferred => {
                ctx.defer_end();
                None
            }
            CaseExit::NotOwned => None,
        };
        if let Some(action) = action {
            self.apply(action);
        }
    }

    fn visit_new_class(&mut self, node: &SyntaxNode) {
        if let Some(name) = self.type_name(node) {
            let ty = self.model.intern_type(&name);
            self.model.constructor(ty);
            if self.frame.argument_depth == 0 {
                self.push(Statement::Call {
                    name: model::CONSTRUCTOR.to_string(),
                    target: ty,
                });
            }
        }
        self.walk_children(node);
    }

    fn visit_invocation(&mut self, node: &SyntaxNode, select: &str) {
        if let Some(name) = self.type_name(node) {
            let target = self.model.intern_type(&name);
            let method = select.rsplit('.').next().unwrap_or(select).trim();
            self.push(Statement::Call {
                name: method.to_string(),
                target,
            });
        }
        self.walk_children(node);
    }

    fn visit_identifier(&mut self, node: &SyntaxNode, name: &str) {
        if self.current_method.is_none() {
            return;
        }
        let Some(var_type) = self.type_name(node) else {
            return;
        };
        let var_type = self.model.intern_type(&var_type);
        let Some(class) = resolve::enclosing_type(self.resolver, node) else {
            return;
        };
        let class = self.model.intern_type(&class);
        self.push(Statement::VarRef {
            name: name.to_string(),
            class,
            var_type,
        });
    }

    fn add_relation(&mut self, ty: TypeId, parent: &SyntaxNode, kind: RelationKind) {
        if let Some(name) = self.type_name(parent) {
            let target = self.model.intern_type(&name);
            self.model.add_relation(ty, kind, target);
        }
    }

    /// Binds a variable declaration to its declared type, if resolvable.
    fn type_ref(&mut self, var: &SyntaxNode) -> Option<TypeRef> {
        let NodeKind::Variable { name } = &var.kind else {
            return None;
        };
        let type_name = self.type_name(var.child(Field::Type)?)?;
        Some(TypeRef {
            name: name.clone(),
            ty: self.model.intern_type(&type_name),
        })
    }

    fn type_name(&self, node: &SyntaxNode) -> Option<String> {
        resolve::type_name(self.resolver, node, &self.model.module.package)
    }

    fn apply(&mut self, action: ScopeAction) {
        match action {
            ScopeAction::Open(condition) => self.open_scope(condition),
            ScopeAction::Close => self.close_scope(),
        }
    }

    fn push(&mut self, stmt: Statement) {
        if let Some(method) = self.current_method {
            self.model.push_statement(method, stmt);
        }
    }

    fn open_scope(&mut self, condition: String) {
        if self.current_method.is_some() {
            self.frame.open_scopes += 1;
            self.push(Statement::OpenScope { condition });
        }
    }

    fn close_scope(&mut self) {
        if self.frame.open_scopes > 0 {
            self.frame.open_scopes -= 1;
            self.push(Statement::CloseScope);
        }
    }

    fn close_open_scopes(&mut self) {
        while self.frame.open_scopes > 0 {
            self.close_scope();
        }
    }
}

fn text_of(node: &SyntaxNode, field: Field) -> &str {
    node.child(field).map(|c| c.text.trim()).unwrap_or("")
}
