//! ast-grep integration for pattern-based node lookup.
//!
//! Patterns use ast-grep's metavariable syntax (`$NAME`, `$$$ITEMS`, `$_`)
//! against the TypeScript grammar. Matches are reported as byte ranges plus
//! grammar kind so callers can resolve them to node handles.

pub mod errors;
pub mod lang;
pub mod matcher;

pub use errors::AstGrepError;
pub use lang::{typescript, SupportLang};
pub use matcher::{PatternMatch, PatternMatcher};
