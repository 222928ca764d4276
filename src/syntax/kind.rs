use std::fmt;

/// Closed set of node kinds the engine understands.
///
/// Grammar kinds without a dedicated variant keep their grammar name in
/// [`SyntaxKind::Token`] (anonymous tokens such as keywords and punctuation)
/// or [`SyntaxKind::Other`] (named nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    /// `import ... from "m";` or `import "m";`
    ImportDeclaration,
    /// `import x = require("m");` or `import x = A.B;`
    ImportEqualsDeclaration,
    ImportClause,
    NamespaceImport,
    NamedImports,
    ImportSpecifier,
    ImportRequireClause,
    ImportAttribute,
    /// `const`, `let` or `var` statement
    VariableStatement,
    VariableDeclaration,
    ExpressionStatement,
    StringLiteral,
    StringFragment,
    Identifier,
    NestedIdentifier,
    PropertyIdentifier,
    ShorthandPropertyIdentifier,
    ObjectLiteral,
    PropertyAssignment,
    Comment,
    Error,
    Token(&'static str),
    Other(&'static str),
}

impl SyntaxKind {
    /// Map a tree-sitter grammar kind onto the closed kind set.
    ///
    /// `children` are the grammar kinds of the node's direct children; the
    /// TypeScript grammar spells `import x = require(...)` as an
    /// `import_statement`, which is told apart from ordinary imports here.
    pub fn classify(grammar_kind: &'static str, named: bool, children: &[&'static str]) -> Self {
        if !named {
            return SyntaxKind::Token(grammar_kind);
        }

        match grammar_kind {
            "program" => SyntaxKind::SourceFile,
            "import_statement" if children.contains(&"import_require_clause") => {
                SyntaxKind::ImportEqualsDeclaration
            }
            "import_statement" => SyntaxKind::ImportDeclaration,
            "import_alias" => SyntaxKind::ImportEqualsDeclaration,
            "import_clause" => SyntaxKind::ImportClause,
            "namespace_import" => SyntaxKind::NamespaceImport,
            "named_imports" => SyntaxKind::NamedImports,
            "import_specifier" => SyntaxKind::ImportSpecifier,
            "import_require_clause" => SyntaxKind::ImportRequireClause,
            "import_attribute" => SyntaxKind::ImportAttribute,
            "lexical_declaration" | "variable_declaration" => SyntaxKind::VariableStatement,
            "variable_declarator" => SyntaxKind::VariableDeclaration,
            "expression_statement" => SyntaxKind::ExpressionStatement,
            "string" => SyntaxKind::StringLiteral,
            "string_fragment" => SyntaxKind::StringFragment,
            "identifier" => SyntaxKind::Identifier,
            "nested_identifier" => SyntaxKind::NestedIdentifier,
            "property_identifier" => SyntaxKind::PropertyIdentifier,
            "shorthand_property_identifier" => SyntaxKind::ShorthandPropertyIdentifier,
            "object" => SyntaxKind::ObjectLiteral,
            "pair" => SyntaxKind::PropertyAssignment,
            "comment" => SyntaxKind::Comment,
            "ERROR" => SyntaxKind::Error,
            other => SyntaxKind::Other(other),
        }
    }

    pub fn is_token(self) -> bool {
        matches!(self, SyntaxKind::Token(_))
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxKind::Token(text) => write!(f, "token `{text}`"),
            SyntaxKind::Other(kind) => write!(f, "{kind}"),
            kind => write!(f, "{kind:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_nodes_are_tokens() {
        assert_eq!(SyntaxKind::classify("import", false, &[]), SyntaxKind::Token("import"));
        assert!(SyntaxKind::classify(",", false, &[]).is_token());
    }

    #[test]
    fn require_imports_are_import_equals() {
        let kind = SyntaxKind::classify(
            "import_statement",
            true,
            &["import", "import_require_clause", ";"],
        );
        assert_eq!(kind, SyntaxKind::ImportEqualsDeclaration);
        assert_eq!(
            SyntaxKind::classify("import_statement", true, &["import", "string", ";"]),
            SyntaxKind::ImportDeclaration
        );
    }

    #[test]
    fn unknown_named_kinds_keep_their_name() {
        assert_eq!(
            SyntaxKind::classify("call_expression", true, &[]),
            SyntaxKind::Other("call_expression")
        );
        assert_eq!(SyntaxKind::ImportClause.to_string(), "ImportClause");
    }
}
