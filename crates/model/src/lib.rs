//! Source Model: the entity graph extracted from one compilation unit.
//!
//! Types and methods live in arenas owned by [`SourceModel`] and refer to each
//! other through [`TypeId`] / [`MethodId`] indices. A type is identified only by
//! its qualified name; interning the same name twice yields the same id.

use serde::Serialize;
use std::collections::HashMap;

pub use ir::CONSTRUCTOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MethodId(pub usize);

#[derive(Debug, Clone, Default, Serialize)]
pub struct Module {
    pub path: String,
    pub package: String,
    pub line_count: usize,
    /// Raw import declarations in source order.
    pub imports: Vec<String>,
}

impl Module {
    pub fn new(path: impl Into<String>, package: impl Into<String>, line_count: usize) -> Self {
        Self {
            path: path.into(),
            package: package.into(),
            line_count,
            imports: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelationKind {
    Extends,
    Implements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRelation {
    pub kind: RelationKind,
    pub target: TypeId,
}

/// Named slot bound to a resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Statement {
    OpenScope { condition: String },
    CloseScope,
    Call { name: String, target: TypeId },
    VarRef { name: String, class: TypeId, var_type: TypeId },
}

/// Where a method came from. Two declarations with the same name and
/// parameter shape are still distinct when they come from different nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Origin {
    Node(usize),
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MethodKey {
    owner: TypeId,
    name: String,
    params: Vec<TypeId>,
    origin: Origin,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelType {
    pub name: String,
    pub module_defined: bool,
    pub member_vars: Vec<TypeRef>,
    pub methods: Vec<MethodId>,
    pub relations: Vec<TypeRelation>,
}

impl ModelType {
    fn new(name: String) -> Self {
        Self {
            name,
            module_defined: false,
            member_vars: Vec::new(),
            methods: Vec::new(),
            relations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Method {
    pub owner: TypeId,
    pub name: String,
    pub origin: Origin,
    pub params: Vec<TypeRef>,
    pub statements: Vec<Statement>,
}

impl Method {
    /// True when every prefix of the statement list closes no more scopes
    /// than it opened and the whole list ends balanced.
    pub fn is_balanced(&self) -> bool {
        let mut depth: usize = 0;
        for stmt in &self.statements {
            match stmt {
                Statement::OpenScope { .. } => depth += 1,
                Statement::CloseScope => match depth.checked_sub(1) {
                    Some(d) => depth = d,
                    None => return false,
                },
                _ => {}
            }
        }
        depth == 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceModel {
    pub module: Module,
    types: Vec<ModelType>,
    methods: Vec<Method>,
    #[serde(skip)]
    type_index: HashMap<String, TypeId>,
    #[serde(skip)]
    method_index: HashMap<MethodKey, MethodId>,
}

impl SourceModel {
    pub fn new(module: Module) -> Self {
        Self {
            module,
            types: Vec::new(),
            methods: Vec::new(),
            type_index: HashMap::new(),
            method_index: HashMap::new(),
        }
    }

    /// Returns the type registered under `name`, creating it if needed.
    pub fn intern_type(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.type_index.get(name) {
            return *id;
        }
        let id = TypeId(self.types.len());
        self.types.push(ModelType::new(name.to_string()));
        self.type_index.insert(name.to_string(), id);
        id
    }

    /// Interns `name` and marks it as declared in the analyzed module.
    pub fn define_type(&mut self, name: &str) -> TypeId {
        let id = self.intern_type(name);
        self.types[id.0].module_defined = true;
        id
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.type_index.get(name).copied()
    }

    pub fn ty(&self, id: TypeId) -> &ModelType {
        &self.types[id.0]
    }

    /// Types in registry order, the order ids are assigned in on output.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &ModelType)> {
        self.types.iter().enumerate().map(|(i, t)| (TypeId(i), t))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Records a relation; returns false when it was already present.
    pub fn add_relation(&mut self, ty: TypeId, kind: RelationKind, target: TypeId) -> bool {
        let rel = TypeRelation { kind, target };
        let relations = &mut self.types[ty.0].relations;
        if relations.contains(&rel) {
            return false;
        }
        relations.push(rel);
        true
    }

    pub fn add_member(&mut self, ty: TypeId, name: &str, target: TypeId) {
        let member = TypeRef {
            name: name.to_string(),
            ty: target,
        };
        let members = &mut self.types[ty.0].member_vars;
        if !members.contains(&member) {
            members.push(member);
        }
    }

    /// Registers a method on `owner`. A second call with the same name,
    /// parameter shape and origin returns the existing method.
    pub fn add_method(
        &mut self,
        owner: TypeId,
        name: &str,
        params: Vec<TypeRef>,
        origin: Origin,
    ) -> MethodId {
        let key = MethodKey {
            owner,
            name: name.to_string(),
            params: params.iter().map(|p| p.ty).collect(),
            origin,
        };
        if let Some(id) = self.method_index.get(&key) {
            return *id;
        }
        let id = MethodId(self.methods.len());
        self.methods.push(Method {
            owner,
            name: name.to_string(),
            origin,
            params,
            statements: Vec::new(),
        });
        self.method_index.insert(key, id);
        self.types[owner.0].methods.push(id);
        id
    }

    /// First method on `owner` called `name`.
    pub fn find_method(&self, owner: TypeId, name: &str) -> Option<MethodId> {
        self.types[owner.0]
            .methods
            .iter()
            .copied()
            .find(|m| self.methods[m.0].name == name)
    }

    /// Constructor of `owner`, synthesized with no parameters when the type
    /// has none yet.
    pub fn constructor(&mut self, owner: TypeId) -> MethodId {
        match self.find_method(owner, CONSTRUCTOR) {
            Some(id) => id,
            None => self.add_method(owner, CONSTRUCTOR, Vec::new(), Origin::Synthesized),
        }
    }

    pub fn method(&self, id: MethodId) -> &Method {
        &self.methods[id.0]
    }

    /// Methods of `ty` in declaration order.
    pub fn methods_of(&self, ty: TypeId) -> impl Iterator<Item = &Method> {
        self.types[ty.0].methods.iter().map(|m| &self.methods[m.0])
    }

    pub fn push_statement(&mut self, method: MethodId, stmt: Statement) {
        self.methods[method.0].statements.push(stmt);
    }

    /// Exports the model to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests;
