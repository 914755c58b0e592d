//! Loading complete declaration graphs from JSON.

use fwrap_decl::{load_graph, DeclKind, FunctionRole, InsertSection, TypeSig};

const SHAPES: &str = r##"{
    "module": {
        "name": "shapes",
        "docstring": "Geometric shapes",
        "imports": ["geom_base"],
        "inserts": [["header", "#include \"shapes.h\""]]
    },
    "typedefs": [
        {"name": "real_t", "type": "double"}
    ],
    "decls": [
        {"kind": "class", "name": "Shape", "location": {"file": "shapes.h", "line": 3}, "children": [
            {"kind": "function", "name": "Shape", "role": "constructor"},
            {"kind": "function", "name": "~Shape", "role": "destructor"},
            {"kind": "function", "name": "area", "type": "real_t"}
        ]},
        {"kind": "class", "name": "Circle", "bases": ["Shape"], "children": [
            {"kind": "function", "name": "Circle", "role": "constructor",
             "params": [{"name": "r", "type": "real_t"}]}
        ]},
        {"kind": "function", "name": "total_area", "type": "double",
         "params": [{"name": "shapes", "type": "const Shape *"}, {"name": "n", "type": "int"}],
         "features": {"generic": "area"}},
        {"kind": "constant", "name": "MAX_SIDES", "type": "int", "value": "(1 << 4)"},
        {"kind": "enum", "children": [
            {"kind": "enum_member", "name": "SMALL", "enum_value": "0"},
            {"kind": "enum_member", "name": "LARGE"}
        ]}
    ]
}"##;

#[test]
fn test_load_shapes_graph() {
    let graph = load_graph(SHAPES).expect("graph should load");

    assert_eq!(graph.module().name, "shapes");
    assert_eq!(graph.module().imports, vec!["geom_base".to_string()]);
    assert_eq!(graph.module().inserts[0].0, InsertSection::Header);
    assert!(graph.module().cplusplus);
    assert_eq!(graph.roots().len(), 5);

    let shape = graph.find_class("Shape").expect("Shape is a class");
    let decl = graph.get(shape);
    assert_eq!(decl.location.to_string(), "shapes.h:3");
    let roles: Vec<_> = graph
        .children(shape)
        .iter()
        .filter_map(|&c| graph.get(c).as_function().map(|f| f.role))
        .collect();
    assert_eq!(
        roles,
        vec![
            FunctionRole::Constructor,
            FunctionRole::Destructor,
            FunctionRole::Member
        ]
    );

    let area = graph.children(shape)[2];
    assert_eq!(graph.resolve(&graph.get(area).ty), TypeSig::Double);
}

#[test]
fn test_load_preserves_features_and_values() {
    let graph = load_graph(SHAPES).expect("graph should load");
    let total = graph.get(graph.roots()[2]);
    assert_eq!(total.features.generic.as_deref(), Some("area"));
    assert_eq!(total.params()[0].ty.to_string(), "const Shape *");

    match &graph.get(graph.roots()[3]).kind {
        DeclKind::Constant { value, .. } => assert_eq!(value, "(1 << 4)"),
        other => panic!("expected constant, got {:?}", other),
    }

    let anon = graph.roots()[4];
    assert!(graph.get(anon).name.is_empty());
    let large = graph.children(anon)[1];
    match &graph.get(large).kind {
        DeclKind::EnumMember { enum_value, value } => {
            assert_eq!(enum_value, &None);
            assert_eq!(value, "LARGE");
        }
        other => panic!("expected enum member, got {:?}", other),
    }
}

#[test]
fn test_load_rejects_unknown_fields() {
    let err = load_graph(r#"{"module": {"name": "m"}, "decls": [{"kind": "class", "name": "A", "colour": 1}]}"#)
        .unwrap_err();
    assert!(err.to_string().contains("colour"));
}
