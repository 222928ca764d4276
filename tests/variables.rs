use serde_json::json;
use syntax_morph::{
    ManipulationError, SourceFile, Structured, VariableDeclaration, VariableDeclarationKind,
    VariableDeclarationPatch, VariableDeclarationStructure, VariableStatement,
    VariableStatementPatch,
};

fn statement_of(text: &str) -> (SourceFile, VariableStatement) {
    let file = SourceFile::new(text).unwrap();
    let stmt = file.variable_statements().unwrap().remove(0);
    (file, stmt)
}

fn declaration_of(text: &str) -> (SourceFile, VariableDeclaration) {
    let (file, stmt) = statement_of(text);
    let decl = stmt.declarations().unwrap().remove(0);
    (file, decl)
}

#[test]
fn rename_expands_shorthand_properties() {
    let (file, decl) = declaration_of("const a = 1;\nconst o = { a };\nf(a, o.a);\n");
    decl.rename("b").unwrap();
    assert_eq!(
        file.full_text(),
        "const b = 1;\nconst o = { a: b };\nf(b, o.a);\n"
    );
    assert_eq!(file.version(), 1);
}

#[test]
fn set_name_leaves_references_alone() {
    let (file, decl) = declaration_of("let a = 1;\na++;\n");
    decl.set_name("b").unwrap();
    assert_eq!(file.full_text(), "let b = 1;\na++;\n");
    assert_eq!(decl.name_node().unwrap().text().unwrap(), "b");
}

#[test]
fn var_let_and_const_share_one_kind() {
    for (text, kind) in [
        ("var a = 1;", VariableDeclarationKind::Var),
        ("let a = 1;", VariableDeclarationKind::Let),
        ("const a = 1;", VariableDeclarationKind::Const),
    ] {
        let (_, stmt) = statement_of(text);
        assert_eq!(stmt.declaration_kind().unwrap(), kind, "{text}");
    }

    let (file, stmt) = statement_of("var a = 1;\n");
    stmt.set_declaration_kind(VariableDeclarationKind::Let).unwrap();
    assert_eq!(file.full_text(), "let a = 1;\n");
    assert!(stmt.is_valid());
    assert_eq!(file.variable_statements().unwrap()[0], stmt);
}

#[test]
fn initializer_handle_and_navigation() {
    let (_, decl) = declaration_of("const a = f(1);");
    let init = decl.initializer().unwrap().unwrap();
    assert_eq!(init.text().unwrap(), "f(1)");

    let stmt = decl.variable_statement().unwrap();
    assert_eq!(stmt.declarations().unwrap()[0], decl);

    let (_, bare) = declaration_of("let a;");
    assert!(bare.initializer().unwrap().is_none());
    assert!(matches!(
        bare.set_initializer(""),
        Err(ManipulationError::ArgumentRange { .. })
    ));
}

#[test]
fn removing_a_declarator_keeps_its_siblings() {
    let (file, stmt) = statement_of("let a = 1, b = 2;\nf();\n");
    let decls = stmt.declarations().unwrap();
    decls[0].remove().unwrap();

    assert_eq!(file.full_text(), "let b = 2;\nf();\n");
    assert!(!decls[0].is_valid());
    assert!(decls[1].is_valid());
    assert_eq!(decls[1].name().unwrap(), "b");

    stmt.remove().unwrap();
    assert_eq!(file.full_text(), "f();\n");
    assert!(!decls[1].is_valid());
}

#[test]
fn statement_structure_serializes() {
    let (_, stmt) = statement_of("let a: number = 1, b;");
    let value = serde_json::to_value(stmt.structure().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "declarationKind": "let",
            "declarations": [
                { "name": "a", "type": "number", "initializer": "1" },
                { "name": "b", "type": null, "initializer": null },
            ],
        })
    );
}

#[test]
fn statement_set_rewrites_kind_and_declarations() {
    let (file, stmt) = statement_of("var a = 1;\nf();\n");
    stmt.set(&VariableStatementPatch {
        declaration_kind: Some(VariableDeclarationKind::Const),
        declarations: Some(vec![
            VariableDeclarationStructure::new("x").with_initializer("2"),
            VariableDeclarationStructure::new("y").with_type("string"),
        ]),
    })
    .unwrap();

    assert_eq!(file.full_text(), "const x = 2, y: string;\nf();\n");
    assert!(stmt.is_valid());
    let names: Vec<String> = stmt
        .declarations()
        .unwrap()
        .iter()
        .map(|d| d.name().unwrap())
        .collect();
    assert_eq!(names, ["x", "y"]);

    let version = file.version();
    stmt.set(&stmt.structure().unwrap().into()).unwrap();
    assert_eq!(file.version(), version);

    let err = stmt
        .set(&VariableStatementPatch {
            declarations: Some(Vec::new()),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ManipulationError::StructuralConflict { .. }));
}

#[test]
fn declaration_set_patch() {
    let (file, decl) = declaration_of("let a = 1;");
    decl.set(&VariableDeclarationPatch {
        name: Some("b".into()),
        type_annotation: Some(Some("string".into())),
        initializer: Some(None),
    })
    .unwrap();
    assert_eq!(file.full_text(), "let b: string;");

    let patch: VariableDeclarationPatch =
        serde_json::from_value(json!({ "type": null, "initializer": "\"s\"" })).unwrap();
    decl.set(&patch).unwrap();
    assert_eq!(file.full_text(), "let b = \"s\";");
    assert_eq!(
        decl.structure().unwrap(),
        VariableDeclarationStructure::new("b").with_initializer("\"s\"")
    );
}

#[test]
fn rejected_set_leaves_no_partial_edit() {
    let (file, decl) = declaration_of("let a = 1;\n");
    let init = decl.initializer().unwrap().unwrap();

    let err = decl
        .set(&VariableDeclarationPatch {
            name: Some("b".into()),
            initializer: Some(Some("  ".into())),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ManipulationError::ArgumentRange { .. }));

    assert_eq!(file.full_text(), "let a = 1;\n");
    assert_eq!(file.version(), 0);
    assert_eq!(decl.name().unwrap(), "a");
    assert!(init.is_valid());
    assert_eq!(init.text().unwrap(), "1");
}

#[test]
fn rename_skips_shadowing_scopes() {
    let (file, decl) = declaration_of(
        "const a = 1;\nfunction f(a) {\n    return a;\n}\nfunction g() {\n    return a;\n}\nf(a);\n",
    );
    decl.rename("b").unwrap();
    assert_eq!(
        file.full_text(),
        "const b = 1;\nfunction f(a) {\n    return a;\n}\nfunction g() {\n    return b;\n}\nf(b);\n"
    );
}
