//! Syntax Morph: structural editing of TypeScript source files
//!
//! A file is parsed into a tree of typed nodes. Callers navigate it through
//! identity-stable [`Node`] handles and issue structural edits (insert,
//! remove, rename, replace). Every edit compiles down to verified byte-span
//! replacements ([`TextEdit`]); the file is then reparsed and every handle
//! outside the edited region is rebound onto the new tree.
//!
//! # Architecture
//!
//! - [`edit`]: the verified text edit primitive and batch validation
//! - [`ts`], [`syntax`]: the tree-sitter parser collaborator and the owned
//!   raw tree it produces
//! - [`manipulation`]: the comma-list editor and the reparse/remap engine
//! - [`node`]: handles, the wrapper cache and per-kind views
//! - [`structure`]: serializable descriptors with `structure()` / `set()`
//! - [`binder`]: reference lookup used by rename operations
//!
//! # Example
//!
//! ```no_run
//! use syntax_morph::{ImportSpecifierStructure, SourceFile};
//!
//! let file = SourceFile::new("import \"./file\";")?;
//! let import = file.import_declarations()?.remove(0);
//! import.add_named_import(ImportSpecifierStructure::new("x"))?;
//! assert_eq!(file.full_text(), "import { x } from \"./file\";");
//! # Ok::<(), syntax_morph::ManipulationError>(())
//! ```

pub mod binder;
pub mod cache;
pub mod config;
pub mod edit;
pub mod manipulation;
pub mod node;
pub mod pool;
pub mod range;
pub mod sg;
pub mod source_file;
pub mod structure;
pub mod syntax;
pub mod ts;

// Re-exports
pub use binder::{LexicalBinder, ReferenceError, ReferenceFinder};
pub use config::{
    global_settings, load_from_path, load_from_str, set_global_settings, ConfigError,
    FormattingSettings, IndentationText, NewLineKind,
};
pub use edit::{EditError, EditVerification, TextEdit};
pub use manipulation::{ManipulationError, Result};
pub use node::{
    ImportDeclaration, ImportEqualsDeclaration, ImportSpecifier, Node, NodeView,
    VariableDeclaration, VariableDeclarationKind, VariableStatement,
};
pub use range::{QuoteKind, TextRange};
pub use sg::{AstGrepError, PatternMatch, PatternMatcher};
pub use source_file::SourceFile;
pub use structure::{
    ImportAttributeStructure, ImportDeclarationPatch, ImportDeclarationStructure,
    ImportEqualsDeclarationPatch, ImportEqualsDeclarationStructure, ImportSpecifierPatch,
    ImportSpecifierStructure, SourceFilePatch, SourceFileStructure, Structure, Structured,
    VariableDeclarationPatch, VariableDeclarationStructure, VariableStatementPatch,
    VariableStatementStructure,
};
pub use syntax::SyntaxKind;
pub use ts::{SourceParser, TreeSitterError};
