use crate::range::TextRange;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeSitterError {
    #[error("failed to load the TypeScript grammar into the parser")]
    LanguageSet,

    #[error("parser returned no tree for {len} bytes of source")]
    ParseFailed { len: usize },

    #[error("TypeScript syntax error at {range}")]
    SyntaxError { range: TextRange },

    #[error("{count} TypeScript syntax errors, first at {first}")]
    MultipleSyntaxErrors { count: usize, first: TextRange },
}
