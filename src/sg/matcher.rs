//! Pattern search over TypeScript source.
//!
//! Patterns use ast-grep's metavariables: `$NAME` binds one node, `$$$NAME`
//! binds a run of nodes and `$_` matches one node without binding it. For
//! example `require($PATH)` finds CommonJS requires and
//! `import $$$ITEMS from $SRC` finds imports with a clause.

use crate::cache;
use crate::range::TextRange;
use crate::sg::errors::AstGrepError;
use crate::sg::lang::typescript;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::{AstGrep, NodeMatch};
use ast_grep_language::SupportLang;
use std::collections::HashMap;

/// One node a pattern matched.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub range: TextRange,
    /// Grammar kind name, e.g. `call_expression`.
    pub kind: String,
    pub text: String,
    /// Metavariable name to the text it bound.
    pub captures: HashMap<String, String>,
}

impl PatternMatch {
    fn from_node_match(m: NodeMatch<StrDoc<SupportLang>>) -> Self {
        let captures: HashMap<String, String> = m.get_env().clone().into();
        let node = m.get_node();
        Self {
            range: TextRange::from(node.range()),
            kind: node.kind().to_string(),
            text: node.text().to_string(),
            captures,
        }
    }
}

/// Parsed snapshot of a source text, ready for pattern queries.
///
/// The snapshot is independent of any `SourceFile`; ranges refer to the text
/// it was built from.
pub struct PatternMatcher {
    grep: AstGrep<StrDoc<SupportLang>>,
}

impl PatternMatcher {
    pub fn new(source: &str) -> Self {
        Self {
            grep: AstGrep::new(source, typescript()),
        }
    }

    /// Every match of `pattern`, in source order.
    pub fn find_all(&self, pattern: &str) -> Result<Vec<PatternMatch>, AstGrepError> {
        let compiled = cache::compiled_pattern(pattern)?;
        Ok(self
            .grep
            .root()
            .find_all(&compiled)
            .map(PatternMatch::from_node_match)
            .collect())
    }

    /// The single match of `pattern`; zero or several matches are errors.
    pub fn find_unique(&self, pattern: &str) -> Result<PatternMatch, AstGrepError> {
        let mut found = self.find_all(pattern)?;
        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err(AstGrepError::NoMatch {
                pattern: pattern.to_string(),
            }),
            count => Err(AstGrepError::AmbiguousMatch {
                pattern: pattern.to_string(),
                count,
            }),
        }
    }
}
