use super::*;
use serde_json::Value as JsonValue;

fn sample_tree() -> SyntaxNode {
    let mut root = SyntaxNode::new(0, NodeKind::CompilationUnit, "class A { int x; }", 1);
    let mut class = SyntaxNode::new(
        1,
        NodeKind::ClassDecl {
            name: "A".into(),
            flavor: ClassFlavor::Class,
        },
        "class A { int x; }",
        1,
    );
    let mut var = SyntaxNode::new(2, NodeKind::Variable { name: "x".into() }, "int x", 1)
        .with_field(Field::Member);
    var.push(SyntaxNode::new(3, NodeKind::Other("integral_type".into()), "int", 1).with_field(Field::Type));
    class.push(var);
    root.push(class);
    root
}

#[test]
fn child_lookup_by_field() {
    let root = sample_tree();
    let class = &root.children[0];
    let member = class.child(Field::Member).expect("member");
    assert_eq!(member.name(), Some("x"));
    assert_eq!(member.child(Field::Type).map(|t| t.text.as_str()), Some("int"));
    assert!(class.child(Field::Extends).is_none());
    assert_eq!(class.children_with(Field::Member).count(), 1);
}

#[test]
fn size_covers_whole_subtree() {
    let root = sample_tree();
    assert_eq!(root.size(), 4);
    assert_eq!(root.children[0].size(), 3);
}

#[test]
fn tree_json_keeps_kinds_and_fields() {
    let tree = SourceTree::new("A.java".into(), sample_tree());
    let json = tree.to_json().unwrap();
    let v: JsonValue = serde_json::from_str(&json).unwrap();
    let var = &v["root"]["children"][0]["children"][0];
    assert_eq!(var["field"], "Member");
    assert_eq!(var["kind"]["Variable"]["name"], "x");
    let back: SourceTree = serde_json::from_str(&json).unwrap();
    assert_eq!(back.root.size(), 4);
}

#[test]
fn symbol_kind_groups() {
    assert!(SymbolKind::Enum.is_type());
    assert!(!SymbolKind::Method.is_type());
    assert!(SymbolKind::Field.is_variable());
    assert!(!SymbolKind::EnumConstant.is_variable());
    let sym = Symbol::new(SymbolKind::Field, "count")
        .qualified("count")
        .enclosed_by("pkg.Counter");
    assert_eq!(sym.enclosing_type.as_deref(), Some("pkg.Counter"));
}
