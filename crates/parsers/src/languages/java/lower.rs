use ir::{ClassFlavor, Field, NodeKind, SyntaxNode, CONSTRUCTOR};
use tree_sitter::Node;

/// Grammar nodes that carry nothing the model needs.
const SKIPPED: &[&str] = &[
    "modifiers",
    "annotation",
    "marker_annotation",
    "type_parameters",
    "throws",
    "dimensions",
    "receiver_parameter",
];

/// Named children of `node` with the grammar field each one occupies.
fn named_fields<'t>(node: Node<'t>) -> Vec<(Option<&'static str>, Node<'t>)> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if child.is_named() && !child.is_extra() {
                out.push((cursor.field_name(), child));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    out
}

/// Converts a tree-sitter Java tree into the IR tree, numbering nodes in
/// pre-order.
pub struct Lowerer<'s> {
    src: &'s str,
    next_id: usize,
}

impl<'s> Lowerer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self { src, next_id: 0 }
    }

    fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.src.as_bytes()).unwrap_or("")
    }

    fn make(&mut self, node: Node, kind: NodeKind) -> SyntaxNode {
        let id = self.next_id;
        self.next_id += 1;
        SyntaxNode::new(id, kind, self.text(node), node.start_position().row + 1)
    }

    pub fn lower_program(&mut self, root: Node) -> SyntaxNode {
        let mut unit = self.make(root, NodeKind::CompilationUnit);
        for (_, child) in named_fields(root) {
            self.lower_into(child, None, &mut unit.children);
        }
        unit
    }

    fn lower_into(&mut self, node: Node, field: Option<Field>, out: &mut Vec<SyntaxNode>) {
        let kind = node.kind();
        if node.is_extra() || SKIPPED.contains(&kind) {
            return;
        }
        let mut lowered = match kind {
            "package_declaration" => self.make(node, NodeKind::Package),
            "import_declaration" => self.make(node, NodeKind::Import),
            "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration" => self.lower_type_decl(node),
            "class_body" => self.lower_anonymous(node),
            "method_declaration" | "annotation_type_element_declaration" => {
                self.lower_method(node, false)
            }
            "constructor_declaration" | "compact_constructor_declaration" => {
                self.lower_method(node, true)
            }
            "field_declaration" | "constant_declaration" => {
                self.lower_declarators(node, Some(Field::Member), out);
                return;
            }
            "local_variable_declaration" => {
                self.lower_declarators(node, field, out);
                return;
            }
            "formal_parameter" | "spread_parameter" | "catch_formal_parameter" => {
                self.lower_param(node)
            }
            "resource" => self.lower_resource(node),
            "block" | "constructor_body" => self.lower_generic(node, NodeKind::Block),
            "if_statement" => self.lower_if(node),
            "for_statement" => self.lower_for(node),
            "enhanced_for_statement" => self.lower_enhanced_for(node),
            "while_statement" => {
                let mut n = self.make(node, NodeKind::WhileLoop);
                self.lower_condition(node, &mut n);
                self.lower_field(node, "body", Field::Body, &mut n);
                n
            }
            "do_statement" => {
                let mut n = self.make(node, NodeKind::DoWhileLoop);
                self.lower_field(node, "body", Field::Body, &mut n);
                self.lower_condition(node, &mut n);
                n
            }
            "switch_expression" | "switch_statement" => self.lower_switch(node),
            "break_statement" => self.make(node, NodeKind::Break),
            "return_statement" => self.lower_generic(node, NodeKind::Return),
            "object_creation_expression" => self.lower_new(node),
            "method_invocation" => self.lower_invocation(node),
            "explicit_constructor_invocation" => self.lower_constructor_call(node),
            "identifier" => {
                let name = self.text(node).to_string();
                self.make(node, NodeKind::Identifier { name, type_position: false })
            }
            "type_identifier" => {
                let name = self.text(node).to_string();
                self.make(node, NodeKind::Identifier { name, type_position: true })
            }
            "generic_type" => self.lower_generic(node, NodeKind::ParameterizedType),
            "field_access" | "scoped_identifier" | "scoped_type_identifier" => {
                self.lower_member_select(node)
            }
            "lambda_expression" => self.lower_lambda(node),
            "binary_expression" => self.lower_binary(node),
            "this" => self.make(node, NodeKind::This),
            "super" => self.make(node, NodeKind::Super),
            other => self.lower_generic(node, NodeKind::Other(other.to_string())),
        };
        if field.is_some() {
            lowered.field = field;
        }
        out.push(lowered);
    }

    fn lower_generic(&mut self, node: Node, kind: NodeKind) -> SyntaxNode {
        let mut n = self.make(node, kind);
        for (_, child) in named_fields(node) {
            self.lower_into(child, None, &mut n.children);
        }
        n
    }

    /// Flattens a left-nested chain of one operator (`a + b + c + ...`) into
    /// one node holding every operand in source order, so long
    /// concatenations do not deepen the tree.
    fn lower_binary(&mut self, node: Node) -> SyntaxNode {
        let mut n = self.make(node, NodeKind::Other(node.kind().to_string()));
        let operator = |b: Node| b.child_by_field_name("operator").map(|o| o.kind());
        let op = operator(node);
        let mut operands = Vec::new();
        let mut cur = node;
        loop {
            if let Some(right) = cur.child_by_field_name("right") {
                operands.push(right);
            }
            match cur.child_by_field_name("left") {
                Some(left) if left.kind() == "binary_expression" && operator(left) == op => {
                    cur = left;
                }
                Some(left) => {
                    operands.push(left);
                    break;
                }
                None => break,
            }
        }
        for operand in operands.into_iter().rev() {
            self.lower_into(operand, None, &mut n.children);
        }
        n
    }

    fn lower_field(&mut self, node: Node, name: &str, field: Field, parent: &mut SyntaxNode) {
        if let Some(child) = node.child_by_field_name(name) {
            self.lower_into(child, Some(field), &mut parent.children);
        }
    }

    /// Lowers the `condition` field, dropping the surrounding parentheses.
    /// `if`, `while` and `do` wrap them in a `condition` node, `switch` in a
    /// `parenthesized_expression`. Only the outer pair goes.
    fn lower_condition(&mut self, node: Node, parent: &mut SyntaxNode) {
        let Some(mut cond) = node.child_by_field_name("condition") else {
            return;
        };
        if matches!(cond.kind(), "condition" | "parenthesized_expression") {
            if let Some((_, inner)) = named_fields(cond).into_iter().next() {
                cond = inner;
            }
        }
        self.lower_into(cond, Some(Field::Condition), &mut parent.children);
    }

    fn lower_type_decl(&mut self, node: Node) -> SyntaxNode {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n))
            .unwrap_or("")
            .to_string();
        let flavor = match node.kind() {
            "interface_declaration" => ClassFlavor::Interface,
            "enum_declaration" => ClassFlavor::Enum,
            "record_declaration" => ClassFlavor::Record,
            "annotation_type_declaration" => ClassFlavor::Annotation,
            _ => ClassFlavor::Class,
        };
        let mut decl = self.make(node, NodeKind::ClassDecl { name, flavor });
        for (field, child) in named_fields(node) {
            match (field, child.kind()) {
                (Some("superclass"), _) => self.lower_type_list(child, Field::Extends, &mut decl),
                (Some("interfaces"), _) | (_, "extends_interfaces") => {
                    self.lower_type_list(child, Field::Implements, &mut decl)
                }
                // record components are the record's fields
                (Some("parameters"), _) => {
                    for (_, param) in named_fields(child) {
                        if matches!(param.kind(), "formal_parameter" | "spread_parameter") {
                            let var = self.lower_param(param).with_field(Field::Member);
                            decl.push(var);
                        }
                    }
                }
                (Some("body"), _) => self.lower_body(child, &mut decl),
                _ => {}
            }
        }
        decl
    }

    fn lower_type_list(&mut self, node: Node, field: Field, decl: &mut SyntaxNode) {
        for (_, child) in named_fields(node) {
            match child.kind() {
                "type_list" | "interface_type_list" => self.lower_type_list(child, field, decl),
                _ => self.lower_into(child, Some(field), &mut decl.children),
            }
        }
    }

    fn lower_body(&mut self, body: Node, decl: &mut SyntaxNode) {
        for (_, child) in named_fields(body) {
            if child.kind() == "enum_body_declarations" {
                self.lower_body(child, decl);
            } else {
                self.lower_into(child, None, &mut decl.children);
            }
        }
    }

    /// Class body of an instance creation or enum constant.
    fn lower_anonymous(&mut self, body: Node) -> SyntaxNode {
        let mut decl = self.make(
            body,
            NodeKind::ClassDecl {
                name: String::new(),
                flavor: ClassFlavor::Class,
            },
        );
        self.lower_body(body, &mut decl);
        decl
    }

    fn lower_method(&mut self, node: Node, constructor: bool) -> SyntaxNode {
        let name = if constructor {
            CONSTRUCTOR.to_string()
        } else {
            node.child_by_field_name("name")
                .map(|n| self.text(n))
                .unwrap_or("")
                .to_string()
        };
        let mut method = self.make(node, NodeKind::MethodDecl { name });
        for (field, child) in named_fields(node) {
            match field {
                Some("type") => self.lower_into(child, Some(Field::ReturnType), &mut method.children),
                Some("parameters") => self.lower_params(child, &mut method),
                Some("body") => self.lower_into(child, Some(Field::Body), &mut method.children),
                _ => {}
            }
        }
        method
    }

    fn lower_params(&mut self, params: Node, parent: &mut SyntaxNode) {
        for (_, child) in named_fields(params) {
            match child.kind() {
                "formal_parameter" | "spread_parameter" => {
                    let var = self.lower_param(child);
                    parent.push(var);
                }
                "identifier" => {
                    let name = self.text(child).to_string();
                    let var = self
                        .make(child, NodeKind::Variable { name })
                        .with_field(Field::Parameter);
                    parent.push(var);
                }
                _ => {}
            }
        }
    }

    /// A parameter-like declaration: `Type name`, `Type... name` or a catch
    /// parameter.
    fn lower_param(&mut self, node: Node) -> SyntaxNode {
        let mut ty = node.child_by_field_name("type");
        let mut name = node.child_by_field_name("name");
        for (_, child) in named_fields(node) {
            match child.kind() {
                "variable_declarator" if name.is_none() => {
                    name = child.child_by_field_name("name")
                }
                "catch_type" if ty.is_none() => ty = Some(child),
                "modifiers" | "dimensions" | "identifier" => {}
                _ if ty.is_none() => ty = Some(child),
                _ => {}
            }
        }
        let name = name.map(|n| self.text(n)).unwrap_or("").to_string();
        let mut var = self
            .make(node, NodeKind::Variable { name })
            .with_field(Field::Parameter);
        if let Some(ty) = ty {
            if ty.kind() == "catch_type" {
                for (_, alt) in named_fields(ty) {
                    self.lower_into(alt, Some(Field::Type), &mut var.children);
                }
            } else {
                self.lower_into(ty, Some(Field::Type), &mut var.children);
            }
        }
        var
    }

    fn lower_declarators(&mut self, node: Node, field: Option<Field>, out: &mut Vec<SyntaxNode>) {
        let ty = node.child_by_field_name("type");
        for (f, decl) in named_fields(node) {
            if f != Some("declarator") {
                continue;
            }
            let name = decl
                .child_by_field_name("name")
                .map(|n| self.text(n))
                .unwrap_or("")
                .to_string();
            let mut var = self.make(decl, NodeKind::Variable { name });
            if let Some(ty) = ty {
                self.lower_into(ty, Some(Field::Type), &mut var.children);
            }
            if let Some(value) = decl.child_by_field_name("value") {
                self.lower_into(value, Some(Field::Init), &mut var.children);
            }
            var.field = field;
            out.push(var);
        }
    }

    fn lower_resource(&mut self, node: Node) -> SyntaxNode {
        let Some(name) = node.child_by_field_name("name") else {
            return self.lower_generic(node, NodeKind::Other("resource".to_string()));
        };
        let name = self.text(name).to_string();
        let mut var = self.make(node, NodeKind::Variable { name });
        self.lower_field(node, "type", Field::Type, &mut var);
        self.lower_field(node, "value", Field::Init, &mut var);
        var
    }

    fn lower_if(&mut self, node: Node) -> SyntaxNode {
        let mut n = self.make(node, NodeKind::If);
        self.lower_condition(node, &mut n);
        self.lower_field(node, "consequence", Field::Body, &mut n);
        self.lower_field(node, "alternative", Field::Alternative, &mut n);
        n
    }

    fn lower_for(&mut self, node: Node) -> SyntaxNode {
        let mut n = self.make(node, NodeKind::ForLoop);
        for (field, child) in named_fields(node) {
            let role = match field {
                Some("init") => Some(Field::Init),
                Some("condition") => Some(Field::Condition),
                Some("update") => Some(Field::Expression),
                Some("body") => Some(Field::Body),
                _ => None,
            };
            self.lower_into(child, role, &mut n.children);
        }
        n
    }

    fn lower_enhanced_for(&mut self, node: Node) -> SyntaxNode {
        let mut n = self.make(node, NodeKind::EnhancedForLoop);
        let ty = node.child_by_field_name("type");
        if let Some(name) = node.child_by_field_name("name") {
            let name_text = self.text(name).to_string();
            let mut var = self.make(name, NodeKind::Variable { name: name_text.clone() });
            if let Some(ty) = ty {
                var.text = format!("{} {}", self.text(ty), name_text);
                self.lower_into(ty, Some(Field::Type), &mut var.children);
            }
            n.push(var.with_field(Field::Variable));
        }
        self.lower_field(node, "value", Field::Expression, &mut n);
        self.lower_field(node, "body", Field::Body, &mut n);
        n
    }

    fn lower_switch(&mut self, node: Node) -> SyntaxNode {
        let mut n = self.make(node, NodeKind::Switch);
        self.lower_condition(node, &mut n);
        let Some(block) = node.child_by_field_name("body") else {
            return n;
        };
        // older grammars put labels and statements straight into the block
        let mut labels = Vec::new();
        let mut body = Vec::new();
        for (_, child) in named_fields(block) {
            match child.kind() {
                "switch_block_statement_group" | "switch_rule" => {
                    let rule = child.kind() == "switch_rule" || has_arrow(child);
                    let (group_labels, group_body): (Vec<_>, Vec<_>) = named_fields(child)
                        .into_iter()
                        .map(|(_, c)| c)
                        .partition(|c| c.kind() == "switch_label");
                    self.lower_cases(&group_labels, &group_body, rule, &mut n);
                }
                "switch_label" => {
                    if !body.is_empty() {
                        self.lower_cases(&labels, &body, false, &mut n);
                        labels.clear();
                        body.clear();
                    }
                    labels.push(child);
                }
                _ if !labels.is_empty() => body.push(child),
                _ => self.lower_into(child, None, &mut n.children),
            }
        }
        if !labels.is_empty() {
            self.lower_cases(&labels, &body, false, &mut n);
        }
        n
    }

    /// Emits one case node per label. Only the last label of a group owns the
    /// statements; `case A, B` counts as two labels.
    fn lower_cases(&mut self, labels: &[Node], body: &[Node], rule: bool, switch: &mut SyntaxNode) {
        let mut entries: Vec<(Node, Option<Node>)> = Vec::new();
        for label in labels {
            let values = named_fields(*label);
            if values.is_empty() {
                entries.push((*label, None));
            }
            for (_, value) in values {
                entries.push((value, Some(value)));
            }
        }
        let count = entries.len();
        for (i, (at, value)) in entries.into_iter().enumerate() {
            let last = i + 1 == count;
            let label = value.map(|v| self.text(v).to_string());
            let kind = NodeKind::Case {
                label,
                has_body: last && !body.is_empty(),
                rule: rule && last,
            };
            let mut case = self.make(at, kind);
            if let Some(value) = value {
                self.lower_into(value, Some(Field::Label), &mut case.children);
            }
            if last {
                for stmt in body {
                    self.lower_into(*stmt, None, &mut case.children);
                }
            }
            switch.push(case);
        }
    }

    fn lower_new(&mut self, node: Node) -> SyntaxNode {
        let mut n = self.make(node, NodeKind::NewClass);
        for (field, child) in named_fields(node) {
            match (field, child.kind()) {
                (Some("type"), _) => self.lower_into(child, Some(Field::Identifier), &mut n.children),
                (Some("arguments"), _) => self.lower_arguments(child, &mut n),
                (Some("type_arguments"), _) => {}
                (_, "class_body") => {
                    let anon = self.lower_anonymous(child);
                    n.push(anon);
                }
                _ => self.lower_into(child, Some(Field::Object), &mut n.children),
            }
        }
        n
    }

    fn lower_arguments(&mut self, args: Node, parent: &mut SyntaxNode) {
        for (_, arg) in named_fields(args) {
            self.lower_into(arg, Some(Field::Argument), &mut parent.children);
        }
    }

    fn lower_invocation(&mut self, node: Node) -> SyntaxNode {
        let object = node.child_by_field_name("object");
        let name = node.child_by_field_name("name");
        let select = match (object, name) {
            (Some(o), Some(n)) => format!("{}.{}", self.text(o), self.text(n)),
            (None, Some(n)) => self.text(n).to_string(),
            _ => self.text(node).to_string(),
        };
        let mut call = self.make(node, NodeKind::MethodInvocation { select });
        if let Some(o) = object {
            self.lower_into(o, Some(Field::Object), &mut call.children);
        }
        if let Some(n) = name {
            self.lower_into(n, Some(Field::Name), &mut call.children);
        }
        if let Some(args) = node.child_by_field_name("arguments") {
            self.lower_arguments(args, &mut call);
        }
        call
    }

    /// `this(...)` and `super(...)` calls inside constructors.
    fn lower_constructor_call(&mut self, node: Node) -> SyntaxNode {
        let target = node.child_by_field_name("constructor");
        let select = target.map(|t| self.text(t)).unwrap_or("super").to_string();
        let mut call = self.make(node, NodeKind::MethodInvocation { select });
        if let Some(t) = target {
            self.lower_into(t, Some(Field::Name), &mut call.children);
        }
        if let Some(args) = node.child_by_field_name("arguments") {
            self.lower_arguments(args, &mut call);
        }
        call
    }

    /// `a.b`, `java.util.List`: only the qualifier is lowered; the selected
    /// name is the last segment of the node text.
    fn lower_member_select(&mut self, node: Node) -> SyntaxNode {
        let mut n = self.make(node, NodeKind::MemberSelect);
        let object = node
            .child_by_field_name("object")
            .or_else(|| node.child_by_field_name("scope"))
            .or_else(|| named_fields(node).into_iter().next().map(|(_, c)| c));
        if let Some(object) = object {
            self.lower_into(object, Some(Field::Object), &mut n.children);
        }
        n
    }

    fn lower_lambda(&mut self, node: Node) -> SyntaxNode {
        let mut n = self.make(node, NodeKind::Lambda);
        if let Some(params) = node.child_by_field_name("parameters") {
            if params.kind() == "identifier" {
                let name = self.text(params).to_string();
                let var = self
                    .make(params, NodeKind::Variable { name })
                    .with_field(Field::Parameter);
                n.push(var);
            } else {
                self.lower_params(params, &mut n);
            }
        }
        self.lower_field(node, "body", Field::Body, &mut n);
        n
    }
}

fn has_arrow(group: Node) -> bool {
    let mut cursor = group.walk();
    let found = group.children(&mut cursor).any(|c| c.kind() == "->");
    found
}

/// Last line of the final top-level declaration, 0 for an empty unit.
pub fn line_count(root: Node) -> usize {
    named_fields(root)
        .last()
        .map(|(_, n)| n.end_position().row + 1)
        .unwrap_or(0)
}
