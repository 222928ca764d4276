use crate::pool;
use crate::range::TextRange;
use crate::syntax::SyntaxTree;
use crate::ts::errors::TreeSitterError;
use crate::ts::parser::SourceParser;

/// Location of an ERROR or MISSING node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntaxErrorSpan {
    pub range: TextRange,
    /// Parser inserted a zero-width node for an expected token
    pub missing: bool,
}

/// Collect syntax errors of an already parsed tree, in source order.
pub fn syntax_errors(tree: &SyntaxTree) -> Vec<SyntaxErrorSpan> {
    tree.error_nodes()
        .into_iter()
        .filter_map(|id| tree.get(id))
        .map(|node| SyntaxErrorSpan {
            range: node.range,
            missing: node.grammar_kind != "ERROR",
        })
        .collect()
}

/// Validate that TypeScript source code has no syntax errors.
pub fn validate_syntax(source: &str) -> Result<(), TreeSitterError> {
    let tree = pool::with_parser(|parser| parser.parse(source))??;

    let errors = syntax_errors(&tree);
    match errors.as_slice() {
        [] => Ok(()),
        [only] => Err(TreeSitterError::SyntaxError { range: only.range }),
        [first, ..] => Err(TreeSitterError::MultipleSyntaxErrors {
            count: errors.len(),
            first: first.range,
        }),
    }
}
