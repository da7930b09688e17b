use super::*;

fn model() -> SourceModel {
    SourceModel::new(Module::new("/src/A.java", "pkg", 12))
}

#[test]
fn interning_same_name_yields_same_type() {
    let mut m = model();
    let a = m.intern_type("pkg.A");
    let b = m.intern_type("pkg.B");
    assert_ne!(a, b);
    assert_eq!(m.intern_type("pkg.A"), a);
    assert_eq!(m.lookup("pkg.B"), Some(b));
    assert_eq!(m.type_count(), 2);
}

#[test]
fn forward_reference_is_defined_later() {
    let mut m = model();
    let fwd = m.intern_type("pkg.Later");
    assert!(!m.ty(fwd).module_defined);
    let def = m.define_type("pkg.Later");
    assert_eq!(fwd, def);
    assert!(m.ty(def).module_defined);
}

#[test]
fn relations_collapse_duplicates() {
    let mut m = model();
    let a = m.define_type("pkg.A");
    let base = m.intern_type("pkg.Base");
    assert!(m.add_relation(a, RelationKind::Extends, base));
    assert!(!m.add_relation(a, RelationKind::Extends, base));
    assert!(m.add_relation(a, RelationKind::Implements, base));
    assert_eq!(m.ty(a).relations.len(), 2);
}

#[test]
fn methods_are_keyed_by_origin() {
    let mut m = model();
    let a = m.define_type("pkg.A");
    let first = m.add_method(a, "run", Vec::new(), Origin::Node(4));
    let again = m.add_method(a, "run", Vec::new(), Origin::Node(4));
    let other = m.add_method(a, "run", Vec::new(), Origin::Node(9));
    assert_eq!(first, again);
    assert_ne!(first, other);
    assert_eq!(m.methods_of(a).count(), 2);
    assert_eq!(m.find_method(a, "run"), Some(first));
}

#[test]
fn constructor_synthesized_once() {
    let mut m = model();
    let b = m.intern_type("pkg.B");
    let c1 = m.constructor(b);
    let c2 = m.constructor(b);
    assert_eq!(c1, c2);
    let inits: Vec<_> = m.methods_of(b).filter(|x| x.name == CONSTRUCTOR).collect();
    assert_eq!(inits.len(), 1);
    assert_eq!(inits[0].origin, Origin::Synthesized);
}

#[test]
fn explicit_constructor_is_reused() {
    let mut m = model();
    let a = m.define_type("pkg.A");
    let int = m.intern_type("int");
    let explicit = m.add_method(
        a,
        CONSTRUCTOR,
        vec![TypeRef { name: "n".into(), ty: int }],
        Origin::Node(3),
    );
    assert_eq!(m.constructor(a), explicit);
}

#[test]
fn balance_detects_early_close() {
    let mut m = model();
    let a = m.define_type("pkg.A");
    let id = m.add_method(a, "f", Vec::new(), Origin::Node(1));
    m.push_statement(id, Statement::CloseScope);
    m.push_statement(id, Statement::OpenScope { condition: "[x]".into() });
    assert!(!m.method(id).is_balanced());

    let ok = m.add_method(a, "g", Vec::new(), Origin::Node(2));
    m.push_statement(ok, Statement::OpenScope { condition: "[x]".into() });
    m.push_statement(ok, Statement::Call { name: "h".into(), target: a });
    m.push_statement(ok, Statement::CloseScope);
    assert!(m.method(ok).is_balanced());
}

#[test]
fn json_dump_lists_types_and_methods() {
    let mut m = model();
    let a = m.define_type("pkg.A");
    m.add_method(a, "f", Vec::new(), Origin::Node(1));
    let json = m.to_json().unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["module"]["path"], "/src/A.java");
    assert_eq!(v["types"][0]["name"], "pkg.A");
    assert_eq!(v["methods"][0]["name"], "f");
}
