use super::names::{erase, FileNames, Qualifier};
use super::*;
use ir::{Field, NodeKind, SymbolKind, SymbolResolver, SyntaxNode, CONSTRUCTOR};
use std::collections::HashMap;


fn parse(src: &str) -> ParsedJava {
    parse_java(src, "/src/demo/Test.java").unwrap()
}

fn collect<'a>(node: &'a SyntaxNode, pred: &dyn Fn(&SyntaxNode) -> bool, out: &mut Vec<&'a SyntaxNode>) {
    if pred(node) {
        out.push(node);
    }
    for child in &node.children {
        collect(child, pred, out);
    }
}

fn find_all<'a>(node: &'a SyntaxNode, pred: &dyn Fn(&SyntaxNode) -> bool) -> Vec<&'a SyntaxNode> {
    let mut out = Vec::new();
    collect(node, pred, &mut out);
    out
}

fn class<'a>(root: &'a SyntaxNode, name: &str) -> &'a SyntaxNode {
    find_all(root, &|n| matches!(&n.kind, NodeKind::ClassDecl { name: c, .. } if c == name))
        .into_iter()
        .next()
        .unwrap()
}

fn method<'a>(root: &'a SyntaxNode, name: &str) -> &'a SyntaxNode {
    find_all(root, &|n| matches!(&n.kind, NodeKind::MethodDecl { name: m } if m == name))
        .into_iter()
        .next()
        .unwrap()
}

#[test]
fn lowers_declarations_and_relations() {
    let src = r#"package demo;

import java.util.List;

public class Shape extends Base implements Drawable, Comparable<Shape> {
    private int size;
    List<String> names, tags;

    public Shape(int size) {
        this.size = size;
    }

    void draw(int x, String label) {
    }
}
"#;
    let parsed = parse(src);
    let root = &parsed.tree.root;
    assert_eq!(root.kind, NodeKind::CompilationUnit);
    assert!(root.children.iter().any(|c| c.kind == NodeKind::Package));
    let import = root.children.iter().find(|c| c.kind == NodeKind::Import).unwrap();
    assert_eq!(import.text, "import java.util.List;");

    let shape = class(root, "Shape");
    assert_eq!(shape.child(Field::Extends).unwrap().text, "Base");
    let ifaces: Vec<&str> = shape
        .children_with(Field::Implements)
        .map(|c| c.text.as_str())
        .collect();
    assert_eq!(ifaces, vec!["Drawable", "Comparable<Shape>"]);
    let members: Vec<&str> = shape
        .children_with(Field::Member)
        .filter_map(SyntaxNode::name)
        .collect();
    assert_eq!(members, vec!["size", "names", "tags"]);
    let tags = shape.children_with(Field::Member).nth(2).unwrap();
    assert_eq!(tags.child(Field::Type).unwrap().kind, NodeKind::ParameterizedType);

    let ctor = method(root, CONSTRUCTOR);
    assert_eq!(ctor.children_with(Field::Parameter).count(), 1);
    let draw = method(root, "draw");
    let params: Vec<&str> = draw
        .children_with(Field::Parameter)
        .filter_map(SyntaxNode::name)
        .collect();
    assert_eq!(params, vec!["x", "label"]);
    assert!(draw.child(Field::Body).is_some());
}

#[test]
fn node_ids_are_unique() {
    let parsed = parse("class A { void f() { int a = 1, b = a; g(a, b); } }");
    let mut ids: Vec<usize> = find_all(&parsed.tree.root, &|_| true)
        .iter()
        .map(|n| n.id)
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert_eq!(parsed.tree.root.size(), total);
}

#[test]
fn conditions_drop_parentheses() {
    let src = "class A { void f(int x) { if (x>0) { run(); } else { stop(); } while (x < 3) x++; do { x--; } while (x > 0); } }";
    let parsed = parse(src);
    let root = &parsed.tree.root;
    let if_node = find_all(root, &|n| n.kind == NodeKind::If)[0];
    assert_eq!(if_node.child(Field::Condition).unwrap().text, "x>0");
    assert!(if_node.child(Field::Body).is_some());
    assert!(if_node.child(Field::Alternative).is_some());
    let while_node = find_all(root, &|n| n.kind == NodeKind::WhileLoop)[0];
    assert_eq!(while_node.child(Field::Condition).unwrap().text, "x < 3");
    let do_node = find_all(root, &|n| n.kind == NodeKind::DoWhileLoop)[0];
    assert_eq!(do_node.child(Field::Condition).unwrap().text, "x > 0");
}

#[test]
fn for_loops_expose_their_parts() {
    let src = r#"class A {
    void f(java.util.List<String> items) {
        for (int i = 0; i < 10; i++) { }
        for (String s : items) { }
    }
}"#;
    let parsed = parse(src);
    let root = &parsed.tree.root;
    let for_node = find_all(root, &|n| n.kind == NodeKind::ForLoop)[0];
    assert_eq!(for_node.child(Field::Condition).unwrap().text, "i < 10");
    assert!(matches!(
        &for_node.child(Field::Init).unwrap().kind,
        NodeKind::Variable { name } if name == "i"
    ));
    let each = find_all(root, &|n| n.kind == NodeKind::EnhancedForLoop)[0];
    assert_eq!(each.child(Field::Variable).unwrap().text, "String s");
    assert_eq!(each.child(Field::Expression).unwrap().text, "items");
}

fn cases(node: &SyntaxNode) -> Vec<(Option<String>, bool, bool)> {
    find_all(node, &|n| matches!(n.kind, NodeKind::Case { .. }))
        .into_iter()
        .map(|n| match &n.kind {
            NodeKind::Case {
                label,
                has_body,
                rule,
            } => (label.clone(), *has_body, *rule),
            _ => unreachable!(),
        })
        .collect()
}

#[test]
fn switch_groups_split_into_labels() {
    let src = r#"class A {
    void f(int k) {
        switch (k) {
            case 1:
            case 2:
                a();
                break;
            default:
                b();
        }
    }
}"#;
    let parsed = parse(src);
    let switch = find_all(&parsed.tree.root, &|n| n.kind == NodeKind::Switch)[0];
    assert_eq!(switch.child(Field::Condition).unwrap().text, "k");
    assert_eq!(
        cases(switch),
        vec![
            (Some("1".to_string()), false, false),
            (Some("2".to_string()), true, false),
            (None, true, false),
        ]
    );
    let two = find_all(switch, &|n| {
        matches!(&n.kind, NodeKind::Case { label: Some(l), .. } if l == "2")
    })[0];
    assert!(two.children.iter().any(|c| c.kind == NodeKind::Break));
}

#[test]
fn arrow_rules_are_marked() {
    let src = r#"class A {
    void f(int k) {
        switch (k) {
            case 1, 2 -> a();
            default -> b();
        }
    }
}"#;
    let parsed = parse(src);
    let switch = find_all(&parsed.tree.root, &|n| n.kind == NodeKind::Switch)[0];
    assert_eq!(
        cases(switch),
        vec![
            (Some("1".to_string()), false, false),
            (Some("2".to_string()), true, true),
            (None, true, true),
        ]
    );
}

#[test]
fn invocations_keep_their_select_text() {
    let parsed = parse("class A { void f(java.util.List<String> list) { list.add(\"x\"); helper(); } }");
    let root = &parsed.tree.root;
    let calls: Vec<&SyntaxNode> =
        find_all(root, &|n| matches!(n.kind, NodeKind::MethodInvocation { .. }));
    let selects: Vec<String> = calls
        .iter()
        .map(|n| match &n.kind {
            NodeKind::MethodInvocation { select } => select.clone(),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(selects, vec!["list.add", "helper"]);
    assert_eq!(calls[0].child(Field::Object).unwrap().text, "list");
    assert_eq!(calls[0].children_with(Field::Argument).count(), 1);
    assert!(calls[1].child(Field::Object).is_none());
}

#[test]
fn anonymous_bodies_become_unnamed_classes() {
    let src = "class A { void f() { Runnable r = new Runnable() { public void run() { go(); } }; } }";
    let parsed = parse(src);
    let new_node = find_all(&parsed.tree.root, &|n| n.kind == NodeKind::NewClass)[0];
    assert_eq!(new_node.child(Field::Identifier).unwrap().text, "Runnable");
    let anon = new_node
        .children
        .iter()
        .find(|c| matches!(&c.kind, NodeKind::ClassDecl { name, .. } if name.is_empty()))
        .unwrap();
    assert!(anon
        .children
        .iter()
        .any(|c| matches!(&c.kind, NodeKind::MethodDecl { name } if name == "run")));
}

#[test]
fn lambda_parameters_are_declarations() {
    let parsed = parse("class A { void f() { run(x -> x.go()); run((String s) -> s.length()); } }");
    let lambdas = find_all(&parsed.tree.root, &|n| n.kind == NodeKind::Lambda);
    assert_eq!(lambdas.len(), 2);
    for lambda in lambdas {
        assert_eq!(lambda.children_with(Field::Parameter).count(), 1);
        assert!(lambda.child(Field::Body).is_some());
    }
}

#[test]
fn line_count_ignores_trailing_blank_lines() {
    let parsed = parse("package p;\n\nclass A {\n}\n\n\n");
    assert_eq!(parsed.line_count, 4);
    assert!(!parsed.has_errors);
    assert_eq!(parse("").line_count, 0);
}

#[test]
fn syntax_errors_are_tolerated() {
    let parsed = parse("class A { void f() { int x = ; } }");
    assert!(parsed.has_errors);
    assert_eq!(parsed.tree.root.kind, NodeKind::CompilationUnit);
    assert!(!parsed.tree.root.children.is_empty());
}

#[test]
fn erasure_strips_arguments_and_arrays() {
    assert_eq!(erase("List<String>"), "List");
    assert_eq!(erase("String[]"), "String");
    assert_eq!(erase("int[][]"), "int");
    assert_eq!(erase("Object..."), "Object");
}

#[test]
fn qualification_order() {
    let parsed = parse(
        "package app;\nimport java.util.List;\nimport java.io.*;\nclass A {}\n",
    );
    let names = FileNames::from_tree(&parsed.tree.root);
    let mut declared = HashMap::new();
    declared.insert("Widget".to_string(), "ui.Widget".to_string());
    let q = Qualifier {
        names: &names,
        declared: &declared,
    };
    assert_eq!(q.qualify("Widget"), "ui.Widget");
    assert_eq!(q.qualify("List"), "java.util.List");
    assert_eq!(q.qualify("String"), "java.lang.String");
    assert_eq!(q.qualify("File"), "java.io.File");
    assert_eq!(q.qualify("int"), "int");
    assert_eq!(q.qualify("T"), "T");
    assert_eq!(
        q.qualify_text("List<Map.Entry<String, Widget>>"),
        "java.util.List<Map.Entry<java.lang.String, ui.Widget>>"
    );
}

#[test]
fn package_and_line_count_reach_the_resolver() {
    let parsed = parse("package a.b;\n\nclass A {\n  void f() {}\n}\n");
    let resolver = parsed.resolve(&[]);
    assert_eq!(resolver.package_name(), "a.b");
    assert_eq!(resolver.line_count(), 5);
    let default_pkg = parse("class A {}").resolve(&[]);
    assert_eq!(default_pkg.package_name(), "");
}

#[test]
fn method_name_identifiers_are_not_variables() {
    let parsed = parse("class A { void f() { helper(); } void helper() {} }");
    let resolver = parsed.resolve(&[]);
    let name = find_all(&parsed.tree.root, &|n| n.field == Some(Field::Name))[0];
    assert_eq!(resolver.symbol(name).unwrap().kind, SymbolKind::Method);
}

#[test]
fn long_concatenation_stays_shallow() {
    let terms = vec!["a"; 5000].join(" + ");
    let src = format!("class A {{ void f(String a) {{ String s = {terms}; }} }}");
    let parsed = parse(&src);
    assert!(!parsed.has_errors);
    let chain = find_all(&parsed.tree.root, &|n| {
        n.kind == NodeKind::Other("binary_expression".into())
    });
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].children.len(), 5000);
    assert!(chain[0]
        .children
        .iter()
        .all(|c| matches!(&c.kind, NodeKind::Identifier { name, .. } if name == "a")));

    let resolver = parsed.resolve(&[]);
    let first = chain[0].children[0].clone();
    assert_eq!(resolver.symbol(&first).unwrap().kind, SymbolKind::Parameter);
}

#[test]
fn nested_operators_keep_operand_order() {
    let parsed = parse("class A { boolean f(int x, int y) { return x * 2 > y - 1; } }");
    let cmp = find_all(&parsed.tree.root, &|n| {
        n.kind == NodeKind::Other("binary_expression".into())
    })[0];
    assert_eq!(cmp.text, "x * 2 > y - 1");
    let operands: Vec<&str> = cmp.children.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(operands, vec!["x * 2", "y - 1"]);
}

#[test]
fn only_the_outer_parentheses_are_dropped() {
    let parsed = parse("class A { void f(boolean a) { if ((a)) { } while ((a) && a) { } } }");
    let root = &parsed.tree.root;
    let if_node = find_all(root, &|n| n.kind == NodeKind::If)[0];
    assert_eq!(if_node.child(Field::Condition).unwrap().text, "(a)");
    let while_node = find_all(root, &|n| n.kind == NodeKind::WhileLoop)[0];
    assert_eq!(while_node.child(Field::Condition).unwrap().text, "(a) && a");
}
