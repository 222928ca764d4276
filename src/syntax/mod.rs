//! Parser-independent raw syntax trees.
//!
//! A [`SyntaxTree`] is the immutable result of one parse pass. Node handles
//! handed to callers live in [`crate::node`]; this module only knows about
//! raw nodes and their arena ids.

pub mod kind;
pub mod tree;

pub use kind::SyntaxKind;
pub use tree::{NodeFacts, RawNode, RawNodeId, SyntaxTree, SyntaxTreeBuilder};
