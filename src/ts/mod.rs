//! Tree-sitter integration: the parser collaborator.
//!
//! Source text is parsed with the TypeScript grammar shipped by
//! `ast-grep-language` and converted into an owned [`SyntaxTree`], so no
//! tree-sitter lifetimes leak into node handles.
//!
//! [`SyntaxTree`]: crate::syntax::SyntaxTree

pub mod errors;
pub mod parser;
pub mod validator;

pub use errors::TreeSitterError;
pub use parser::{PooledParser, SourceParser, TypeScriptParser};
pub use validator::{syntax_errors, validate_syntax, SyntaxErrorSpan};
