use crate::pool;
use crate::range::TextRange;
use crate::syntax::{NodeFacts, SyntaxTree, SyntaxTreeBuilder};
use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Parser, Tree};

/// The parser collaborator.
///
/// Implementations must be total: any text yields a tree, possibly holding
/// error nodes. `Err` is reserved for the parser itself failing.
pub trait SourceParser {
    fn parse(&mut self, text: &str) -> Result<SyntaxTree, TreeSitterError>;
}

/// Tree-sitter parser wrapper for TypeScript source code.
pub struct TypeScriptParser {
    parser: Parser,
}

impl TypeScriptParser {
    pub fn new() -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        let ts_lang = SupportLang::TypeScript.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| TreeSitterError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse_tree(&mut self, source: &str) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed { len: source.len() })
    }
}

impl SourceParser for TypeScriptParser {
    fn parse(&mut self, text: &str) -> Result<SyntaxTree, TreeSitterError> {
        let tree = self.parse_tree(text)?;
        Ok(convert(&tree))
    }
}

/// [`SourceParser`] backed by the thread-local parser pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct PooledParser;

impl SourceParser for PooledParser {
    fn parse(&mut self, text: &str) -> Result<SyntaxTree, TreeSitterError> {
        pool::with_parser(|parser| parser.parse(text))?
    }
}

/// Copy a tree-sitter tree into an owned arena, pre-order.
fn convert(tree: &Tree) -> SyntaxTree {
    let mut builder = SyntaxTreeBuilder::new();
    let mut cursor = tree.walk();
    let mut open: Vec<u32> = Vec::new();

    loop {
        let node = cursor.node();
        let facts = NodeFacts {
            grammar_kind: node.kind(),
            range: TextRange::new(node.start_byte(), node.end_byte()),
            field: cursor.field_name(),
            named: node.is_named(),
            is_error: node.is_error() || node.is_missing(),
            is_extra: node.is_extra(),
        };
        let index = builder.start_node(facts, open.last().copied());

        if cursor.goto_first_child() {
            open.push(index);
            continue;
        }
        builder.finish_node(index);

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return builder.finish();
            }
            if let Some(parent) = open.pop() {
                builder.finish_node(parent);
            }
        }
    }
}
