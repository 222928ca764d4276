//! The semantic binder collaborator.
//!
//! Rename propagation asks a [`ReferenceFinder`] for every site bound to a
//! declaration. The shipped [`LexicalBinder`] resolves names within one file
//! using the lexical scopes of the grammar: blocks, functions, `for` heads
//! and `catch` clauses.

use crate::range::TextRange;
use crate::syntax::{RawNodeId, SyntaxKind, SyntaxTree};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("declaration node does not belong to the current tree")]
    UnknownDeclaration,

    #[error("declaration at {range} is not an identifier (found {kind})")]
    NotAnIdentifier { range: TextRange, kind: String },

    #[error("reference lookup failed: {0}")]
    Lookup(String),
}

/// Resolves the reference sites of a declaration.
pub trait ReferenceFinder {
    /// Ranges of every identifier bound to `declaration`, in source order,
    /// excluding the declaration's own name.
    fn find_references(
        &self,
        tree: &SyntaxTree,
        text: &str,
        declaration: RawNodeId,
    ) -> Result<Vec<TextRange>, ReferenceError>;
}

/// Same-file binder with lexical scoping.
///
/// An identifier refers to the declaration when it has the same text and no
/// scope between the two declares that name again. `var` declarations belong
/// to the enclosing function, `let`, `const` and function declarations to the
/// enclosing block. Names bound inside destructuring patterns are not seen as
/// declarations, so they do not shadow.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalBinder;

fn is_function_scope(grammar_kind: &str) -> bool {
    matches!(
        grammar_kind,
        "program"
            | "function_declaration"
            | "generator_function_declaration"
            | "function_expression"
            | "function"
            | "generator_function"
            | "arrow_function"
            | "method_definition"
    )
}

fn is_scope(grammar_kind: &str) -> bool {
    is_function_scope(grammar_kind)
        || matches!(
            grammar_kind,
            "statement_block" | "for_statement" | "for_in_statement" | "catch_clause"
        )
}

impl LexicalBinder {
    /// The exported name in `{ a as b }` names the other module's binding.
    fn is_foreign_name(tree: &SyntaxTree, id: RawNodeId) -> bool {
        let Some(node) = tree.get(id) else {
            return false;
        };
        let Some(parent) = tree.parent(id) else {
            return false;
        };
        node.field == Some("name")
            && tree.kind(parent) == Some(SyntaxKind::ImportSpecifier)
            && tree.child_by_field(parent, "alias").is_some()
    }

    fn nearest(tree: &SyntaxTree, id: RawNodeId, pred: fn(&str) -> bool) -> Option<RawNodeId> {
        let mut current = tree.parent(id);
        while let Some(node) = current {
            if tree.get(node).is_some_and(|n| pred(n.grammar_kind)) {
                return Some(node);
            }
            current = tree.parent(node);
        }
        None
    }

    /// Scope an identifier declares its name in, or `None` when it is not a
    /// declaring position.
    fn binding_scope(tree: &SyntaxTree, id: RawNodeId) -> Option<RawNodeId> {
        let field = tree.get(id)?.field;
        let parent = tree.parent(id)?;
        match (tree.get(parent)?.grammar_kind, field) {
            ("variable_declarator", Some("name")) => {
                let statement = tree.parent(parent)?;
                if tree.get(statement)?.grammar_kind == "variable_declaration" {
                    Self::nearest(tree, statement, is_function_scope)
                } else {
                    Self::nearest(tree, statement, is_scope)
                }
            }
            (
                "function_declaration" | "generator_function_declaration" | "class_declaration",
                Some("name"),
            ) => Self::nearest(tree, parent, is_scope),
            ("function_expression" | "function" | "generator_function", Some("name")) => Some(parent),
            ("required_parameter" | "optional_parameter", Some("pattern")) => {
                Self::nearest(tree, parent, is_function_scope)
            }
            ("arrow_function", Some("parameter"))
            | ("catch_clause", Some("parameter"))
            | ("for_in_statement", Some("left")) => Some(parent),
            (
                "import_clause" | "import_specifier" | "namespace_import" | "import_require_clause"
                | "import_alias",
                _,
            ) => Some(tree.root()),
            _ => None,
        }
    }

    /// True when the innermost scope around `id` that binds the name is
    /// `scope`.
    fn resolves_to(
        tree: &SyntaxTree,
        id: RawNodeId,
        scope: RawNodeId,
        shadows: &HashSet<RawNodeId>,
    ) -> bool {
        let mut current = tree.parent(id);
        while let Some(node) = current {
            if node == scope {
                return true;
            }
            if shadows.contains(&node) {
                return false;
            }
            current = tree.parent(node);
        }
        false
    }
}

impl ReferenceFinder for LexicalBinder {
    fn find_references(
        &self,
        tree: &SyntaxTree,
        text: &str,
        declaration: RawNodeId,
    ) -> Result<Vec<TextRange>, ReferenceError> {
        let decl = tree
            .get(declaration)
            .ok_or(ReferenceError::UnknownDeclaration)?;
        if decl.kind != SyntaxKind::Identifier {
            return Err(ReferenceError::NotAnIdentifier {
                range: decl.range,
                kind: decl.kind.to_string(),
            });
        }
        let name = tree.text(declaration, text);
        let scope = Self::binding_scope(tree, declaration)
            .or_else(|| Self::nearest(tree, declaration, is_scope))
            .unwrap_or_else(|| tree.root());

        let candidates: Vec<RawNodeId> = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|&id| id != declaration)
            .filter(|&id| {
                matches!(
                    tree.kind(id),
                    Some(SyntaxKind::Identifier | SyntaxKind::ShorthandPropertyIdentifier)
                )
            })
            .filter(|&id| tree.text(id, text) == name)
            .filter(|&id| !Self::is_foreign_name(tree, id))
            .collect();

        let shadows: HashSet<RawNodeId> = candidates
            .iter()
            .filter_map(|&id| Self::binding_scope(tree, id))
            .filter(|&s| s != scope)
            .collect();

        Ok(candidates
            .into_iter()
            .filter(|&id| Self::resolves_to(tree, id, scope, &shadows))
            .filter_map(|id| tree.range(id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::{SourceParser, TypeScriptParser};

    fn first_identifier(tree: &SyntaxTree, text: &str, name: &str) -> RawNodeId {
        tree.descendants(tree.root())
            .into_iter()
            .find(|&id| tree.kind(id) == Some(SyntaxKind::Identifier) && tree.text(id, text) == name)
            .unwrap()
    }

    #[test]
    fn finds_identifier_references() {
        let text = "const value = 1;\nvalue + 2;\nconst other = { value };\nobj.value;\n";
        let tree = TypeScriptParser::new().unwrap().parse(text).unwrap();
        let decl = first_identifier(&tree, text, "value");

        let refs = LexicalBinder.find_references(&tree, text, decl).unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| &text[r.as_range()] == "value"));
        assert!(refs[0].pos < refs[1].pos);
    }

    #[test]
    fn skips_exported_names_of_aliased_imports() {
        let text = "import { a as b } from \"m\";\nconst a = 1;\na;\n";
        let tree = TypeScriptParser::new().unwrap().parse(text).unwrap();
        let decl = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|&id| tree.kind(id) == Some(SyntaxKind::Identifier) && tree.text(id, text) == "a")
            .nth(1)
            .unwrap();

        let refs = LexicalBinder.find_references(&tree, text, decl).unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn inner_declarations_shadow_the_outer_name() {
        let text = "const a = 1;\nfunction f(a) { return a; }\nfunction g() { let a = 2; a; }\n{ const a = 3; }\nfunction h() { a; }\na;\n";
        let tree = TypeScriptParser::new().unwrap().parse(text).unwrap();
        let decl = first_identifier(&tree, text, "a");

        let refs = LexicalBinder.find_references(&tree, text, decl).unwrap();
        let inner = text.find("function h").unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs[0].pos > inner);
        assert_eq!(refs[1].pos, text.rfind("a;").unwrap());
    }

    #[test]
    fn var_shadows_the_whole_function() {
        let text = "let a = 1;\nfunction k() {\n  if (x) { var a = 2; }\n  a;\n}\na;\n";
        let tree = TypeScriptParser::new().unwrap().parse(text).unwrap();
        let decl = first_identifier(&tree, text, "a");

        let refs = LexicalBinder.find_references(&tree, text, decl).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].pos, text.rfind("a;").unwrap());
    }

    #[test]
    fn inner_declaration_sees_only_its_scope() {
        let text = "const a = 1;\nfunction f() { let a = 2; a; }\na;\n";
        let tree = TypeScriptParser::new().unwrap().parse(text).unwrap();
        let decl = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|&id| tree.kind(id) == Some(SyntaxKind::Identifier) && tree.text(id, text) == "a")
            .nth(1)
            .unwrap();

        let refs = LexicalBinder.find_references(&tree, text, decl).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].pos, text.find("a; }").unwrap());
    }

    #[test]
    fn rejects_non_identifiers() {
        let text = "const a = 1;";
        let tree = TypeScriptParser::new().unwrap().parse(text).unwrap();
        let err = LexicalBinder
            .find_references(&tree, text, tree.root())
            .unwrap_err();
        assert!(matches!(err, ReferenceError::NotAnIdentifier { .. }));
    }
}
