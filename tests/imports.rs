use serde_json::json;
use syntax_morph::{
    ImportAttributeStructure, ImportDeclaration, ImportDeclarationPatch, ImportSpecifier,
    ImportSpecifierPatch, ImportSpecifierStructure, ManipulationError, SourceFile, Structured,
};

fn import_of(text: &str) -> (SourceFile, ImportDeclaration) {
    let file = SourceFile::new(text).unwrap();
    let decl = file.import_declarations().unwrap().remove(0);
    (file, decl)
}

fn specifier_of(text: &str, index: usize) -> (SourceFile, ImportSpecifier) {
    let (file, decl) = import_of(text);
    let spec = decl.named_imports().unwrap().remove(index);
    (file, spec)
}

fn check(text: &str, expected: &str, f: impl FnOnce(&ImportDeclaration)) {
    let (file, decl) = import_of(text);
    f(&decl);
    assert_eq!(file.full_text(), expected, "editing {text:?}");
}

#[test]
fn type_only_keyword() {
    check("import {a} from \"./test\";", "import type {a} from \"./test\";", |d| {
        d.set_is_type_only(true).unwrap();
        assert!(d.is_type_only().unwrap());
    });
    check("import type {a} from \"./test\";", "import {a} from \"./test\";", |d| {
        d.set_is_type_only(false).unwrap();
    });
    check("import {a} from \"./test\";", "import {a} from \"./test\";", |d| {
        d.set_is_type_only(false).unwrap();
    });

    let (file, decl) = import_of("import \"./test\";");
    let err = decl.set_is_type_only(true).unwrap_err();
    assert!(matches!(err, ManipulationError::StructuralConflict { .. }));
    assert_eq!(file.full_text(), "import \"./test\";");
}

#[test]
fn module_specifier_keeps_its_quote() {
    check("import {a} from './test';", "import {a} from './other';", |d| {
        d.set_module_specifier("./other").unwrap();
        assert_eq!(d.module_specifier_value().unwrap(), "./other");
        assert_eq!(d.module_specifier().unwrap().text().unwrap(), "'./other'");
    });

    let (_, decl) = import_of("import \"../up\";");
    assert!(decl.is_module_specifier_relative().unwrap());
    let (_, decl) = import_of("import \"pkg\";");
    assert!(!decl.is_module_specifier_relative().unwrap());
}

#[test]
fn set_default_import_in_every_clause_shape() {
    check("import \"./file\";", "import identifier from \"./file\";", |d| {
        d.set_default_import("identifier").unwrap();
    });
    check(
        "import * as ns from \"./file\";",
        "import identifier, * as ns from \"./file\";",
        |d| d.set_default_import("identifier").unwrap(),
    );
    check(
        "import {a} from \"./file\";",
        "import identifier, {a} from \"./file\";",
        |d| d.set_default_import("identifier").unwrap(),
    );
    check("import d from \"./file\";", "import identifier from \"./file\";", |d| {
        d.set_default_import("identifier").unwrap();
        assert_eq!(d.default_import_or_err().unwrap().text().unwrap(), "identifier");
    });
    check("import d from \"./file\";", "import \"./file\";", |d| {
        d.set_default_import("  ").unwrap();
    });
}

#[test]
fn rename_default_import_updates_references() {
    check(
        "import d from \"./file\";\nlet x = d;\n",
        "import e from \"./file\";\nlet x = e;\n",
        |d| d.rename_default_import("e").unwrap(),
    );
    check(
        "import d from \"./file\";\nlet x = d;\n",
        "import e from \"./file\";\nlet x = d;\n",
        |d| d.set_default_import("e").unwrap(),
    );
}

#[test]
fn remove_default_import() {
    check("import d, {a} from \"m\";", "import {a} from \"m\";", |d| {
        d.remove_default_import().unwrap();
    });
    check("import d from \"m\";", "import \"m\";", |d| {
        d.remove_default_import().unwrap();
        assert!(d.import_clause().unwrap().is_none());
    });
    check("import type d from \"m\";", "import type {} from \"m\";", |d| {
        d.remove_default_import().unwrap();
    });
    check("import {a} from \"m\";", "import {a} from \"m\";", |d| {
        d.remove_default_import().unwrap();
    });

    let (_, decl) = import_of("import {a} from \"m\";");
    assert!(matches!(
        decl.default_import_or_err(),
        Err(ManipulationError::MissingChild { .. })
    ));
}

#[test]
fn namespace_import() {
    check("import \"m\";", "import * as ns from \"m\";", |d| {
        d.set_namespace_import("ns").unwrap();
        assert_eq!(d.namespace_import_or_err().unwrap().text().unwrap(), "ns");
    });
    check("import d from \"m\";", "import d, * as ns from \"m\";", |d| {
        d.set_namespace_import("ns").unwrap();
    });
    check("import {} from \"m\";", "import * as ns from \"m\";", |d| {
        d.set_namespace_import("ns").unwrap();
    });
    check(
        "import * as old from \"m\";\nold.run();\n",
        "import * as ns from \"m\";\nns.run();\n",
        |d| d.set_namespace_import("ns").unwrap(),
    );
    check("import d, * as ns from \"m\";", "import d from \"m\";", |d| {
        d.remove_namespace_import().unwrap();
    });
    check("import * as ns from \"m\";", "import \"m\";", |d| {
        d.remove_namespace_import().unwrap();
    });
    check("import type * as ns from \"m\";", "import type {} from \"m\";", |d| {
        d.set_namespace_import("").unwrap();
    });
}

#[test]
fn add_named_imports_in_every_clause_shape() {
    check("import d from \"m\";", "import d, { a, b } from \"m\";", |d| {
        let added = d.add_named_imports(&["a".into(), "b".into()]).unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(added[1].name().unwrap(), "b");
    });
    check("import {} from \"m\";", "import { a as b } from \"m\";", |d| {
        d.add_named_import(ImportSpecifierStructure::new("a").with_alias("b"))
            .unwrap();
    });
    check("import {a} from \"m\";", "import {z, a} from \"m\";", |d| {
        d.insert_named_import(0, "z".into()).unwrap();
    });
    check("import {a} from \"m\";", "import {a, type T} from \"m\";", |d| {
        d.add_named_import(ImportSpecifierStructure::new("T").type_only())
            .unwrap();
    });

    let (file, decl) = import_of("import * as ns from \"m\";");
    let err = decl.add_named_import("a".into()).unwrap_err();
    assert!(matches!(err, ManipulationError::StructuralConflict { .. }));
    assert_eq!(file.full_text(), "import * as ns from \"m\";");
}

#[test]
fn remove_named_imports() {
    check("import d, {a, b} from \"m\";", "import d from \"m\";", |d| {
        d.remove_named_imports().unwrap();
        assert!(d.named_imports().unwrap().is_empty());
    });
    check("import {a} from \"m\";", "import \"m\";", |d| {
        d.remove_named_imports().unwrap();
    });
    check("import type {a} from \"m\";", "import type {} from \"m\";", |d| {
        d.remove_named_imports().unwrap();
    });
    check("import { a, b, c } from \"m\";", "import { b } from \"m\";", |d| {
        d.remove_named_imports_at(&[2, 0]).unwrap();
    });
    check("import { a, b } from \"m\";", "import {} from \"m\";", |d| {
        d.remove_named_imports_at(&[0, 1]).unwrap();
        assert!(d.import_clause().unwrap().is_some());
    });
}

#[test]
fn import_attributes() {
    let (file, decl) = import_of("import {a} from \"./test\";");
    assert_eq!(decl.attributes().unwrap(), None);

    decl.set_attributes(Some(&[ImportAttributeStructure::new("type", "json")]))
        .unwrap();
    assert_eq!(
        file.full_text(),
        "import {a} from \"./test\" with {\n    type: \"json\"\n};"
    );
    assert_eq!(
        decl.attributes().unwrap(),
        Some(vec![ImportAttributeStructure::new("type", "\"json\"")])
    );

    decl.set_attributes(None).unwrap();
    assert_eq!(file.full_text(), "import {a} from \"./test\";");
}

#[test]
fn attributes_follow_statement_indentation() {
    let (file, decl) = import_of("  import {a} from \"m\";");
    decl.set_attributes(Some(&[ImportAttributeStructure::new("type", "json")]))
        .unwrap();
    assert_eq!(
        file.full_text(),
        "  import {a} from \"m\" with {\n      type: \"json\"\n  };"
    );
}

#[test]
fn remove_takes_the_line_with_it() {
    let file = SourceFile::new("import \"a\";\nimport \"b\";\nf();\n").unwrap();
    let imports = file.import_declarations().unwrap();
    imports[0].remove().unwrap();

    assert_eq!(file.full_text(), "import \"b\";\nf();\n");
    assert!(!imports[0].is_valid());
    assert!(imports[1].is_valid());
    assert_eq!(imports[1].module_specifier_value().unwrap(), "b");
}

#[test]
fn structure_serializes_camel_case() {
    let (_, decl) = import_of("import d, { a as b, type c } from \"./m\" with { type: \"json\" };");
    let value = serde_json::to_value(decl.structure().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "isTypeOnly": false,
            "defaultImport": "d",
            "namespaceImport": null,
            "namedImports": [
                { "name": "a", "alias": "b", "isTypeOnly": false },
                { "name": "c", "alias": null, "isTypeOnly": true },
            ],
            "moduleSpecifier": "./m",
            "attributes": [{ "name": "type", "value": "\"json\"" }],
        })
    );
}

#[test]
fn set_applies_every_changed_property() {
    let (file, decl) = import_of("import \"./m\";");
    let patch = ImportDeclarationPatch {
        default_import: Some(Some("d".into())),
        named_imports: Some(vec!["a".into()]),
        module_specifier: Some("./n".into()),
        ..Default::default()
    };
    decl.set(&patch).unwrap();
    assert_eq!(file.full_text(), "import d, { a } from \"./n\";");

    let replaced = ImportDeclarationPatch {
        default_import: Some(None),
        named_imports: Some(vec!["c".into()]),
        ..Default::default()
    };
    decl.set(&replaced).unwrap();
    assert_eq!(file.full_text(), "import { c } from \"./n\";");
}

#[test]
fn set_from_json_patch() {
    let (file, decl) = import_of("import {a, b} from \"m\";");
    let patch: ImportDeclarationPatch =
        serde_json::from_value(json!({ "namedImports": [], "namespaceImport": "ns" })).unwrap();
    decl.set(&patch).unwrap();
    assert_eq!(file.full_text(), "import * as ns from \"m\";");
}

#[test]
fn set_rejects_namespace_with_named_imports() {
    let (file, decl) = import_of("import {a} from \"m\";");
    let patch = ImportDeclarationPatch {
        namespace_import: Some(Some("ns".into())),
        ..Default::default()
    };
    let err = decl.set(&patch).unwrap_err();
    assert!(matches!(err, ManipulationError::StructuralConflict { .. }));
    assert_eq!(file.full_text(), "import {a} from \"m\";");
    assert_eq!(file.version(), 0);
}

#[test]
fn specifier_name_and_alias() {
    let (file, spec) = specifier_of("import {a} from \"m\";\na;\n", 0);
    spec.set_name("b").unwrap();
    assert_eq!(file.full_text(), "import {b} from \"m\";\na;\n");

    spec.set_alias("c").unwrap();
    assert_eq!(file.full_text(), "import {b as c} from \"m\";\na;\n");
    assert_eq!(spec.alias().unwrap().as_deref(), Some("c"));
    assert_eq!(spec.alias_node().unwrap().unwrap().text().unwrap(), "c");

    spec.remove_alias().unwrap();
    assert_eq!(file.full_text(), "import {b} from \"m\";\na;\n");
    assert_eq!(spec.alias().unwrap(), None);
}

#[test]
fn specifier_rename_alias_updates_references() {
    let (file, spec) = specifier_of("import {a} from \"m\";\nuse(a);\n", 0);
    spec.rename_alias("b").unwrap();
    assert_eq!(file.full_text(), "import {a as b} from \"m\";\nuse(b);\n");

    spec.rename_alias("c").unwrap();
    assert_eq!(file.full_text(), "import {a as c} from \"m\";\nuse(c);\n");

    spec.rename_alias("").unwrap();
    assert_eq!(file.full_text(), "import {a} from \"m\";\nuse(a);\n");
    assert_eq!(spec.name().unwrap(), "a");
}

#[test]
fn specifier_type_only() {
    let (file, spec) = specifier_of("import {a, b} from \"m\";", 1);
    spec.set_is_type_only(true).unwrap();
    assert_eq!(file.full_text(), "import {a, type b} from \"m\";");
    assert!(spec.is_type_only().unwrap());

    spec.set_is_type_only(false).unwrap();
    assert_eq!(file.full_text(), "import {a, b} from \"m\";");
}

#[test]
fn specifier_remove() {
    let (file, spec) = specifier_of("import {a, b} from \"m\";", 1);
    let decl = spec.import_declaration().unwrap();
    spec.remove().unwrap();
    assert_eq!(file.full_text(), "import {a} from \"m\";");
    assert!(!spec.is_valid());

    decl.named_imports().unwrap()[0].remove().unwrap();
    assert_eq!(file.full_text(), "import \"m\";");
    assert!(decl.is_valid());
}

#[test]
fn specifier_set_patch() {
    let (file, spec) = specifier_of("import {a} from \"m\";", 0);
    assert_eq!(spec.structure().unwrap(), ImportSpecifierStructure::new("a"));

    spec.set(&ImportSpecifierPatch {
        name: Some("b".into()),
        alias: Some(Some("c".into())),
        is_type_only: Some(true),
    })
    .unwrap();
    assert_eq!(file.full_text(), "import {type b as c} from \"m\";");

    spec.set(&ImportSpecifierPatch {
        alias: Some(None),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(file.full_text(), "import {type b} from \"m\";");
}

#[test]
fn rejected_set_leaves_no_partial_edit() {
    let (file, decl) = import_of("import \"m\";\nlet x = 1;\n");
    let specifier = decl.module_specifier().unwrap();
    let next = file.statements()[1].clone();

    let err = decl
        .set(&ImportDeclarationPatch {
            module_specifier: Some("n".into()),
            is_type_only: Some(true),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ManipulationError::StructuralConflict { .. }));

    assert_eq!(file.full_text(), "import \"m\";\nlet x = 1;\n");
    assert_eq!(file.version(), 0);
    assert_eq!(specifier.text().unwrap(), "\"m\"");
    assert_eq!(decl.module_specifier_value().unwrap(), "m");
    assert_eq!(next.text().unwrap(), "let x = 1;");
}

#[test]
fn multi_property_set_is_one_version() {
    let (file, decl) = import_of("import {a} from \"m\";");
    decl.set(&ImportDeclarationPatch {
        module_specifier: Some("n".into()),
        is_type_only: Some(true),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(file.full_text(), "import type {a} from \"n\";");
    assert_eq!(file.version(), 1);
}

#[test]
fn removing_a_specifier_keeps_neighbouring_comments() {
    let (file, spec) = specifier_of("import { a /* keep */, b } from \"m\";", 0);
    spec.remove().unwrap();
    assert_eq!(file.full_text(), "import { /* keep */ b } from \"m\";");

    let (file, spec) = specifier_of("import { a, /* about b */ b } from \"m\";", 0);
    spec.remove().unwrap();
    assert_eq!(file.full_text(), "import { /* about b */ b } from \"m\";");
}
