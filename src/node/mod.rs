//! Caller-facing node handles.
//!
//! A [`Node`] names a wrapper slot in its file's [`WrapperCache`], not a raw
//! node. After every edit the engine rebinds slots onto the new tree, so a
//! handle stays valid (and equal to itself) for as long as the node it names
//! survives. Kind-specific operations are reached through [`Node::view`].
//!
//! [`WrapperCache`]: cache::WrapperCache

pub mod cache;
pub mod imports;
pub mod variables;

pub use imports::{ImportDeclaration, ImportEqualsDeclaration, ImportSpecifier};
pub use variables::{VariableDeclaration, VariableDeclarationKind, VariableStatement};

use crate::edit::TextEdit;
use crate::manipulation::engine::FileState;
use crate::manipulation::errors::{ManipulationError, Result};
use crate::range::TextRange;
use crate::source_file::SourceFile;
use crate::syntax::{RawNodeId, SyntaxKind};
use cache::WrapperId;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Identity-stable handle over one node of a source file.
#[derive(Clone)]
pub struct Node {
    pub(crate) file: Rc<RefCell<FileState>>,
    pub(crate) id: WrapperId,
}

impl Node {
    pub(crate) fn wrap(file: &Rc<RefCell<FileState>>, raw: RawNodeId) -> Node {
        let id = file.borrow_mut().wrap(raw);
        Node {
            file: Rc::clone(file),
            id,
        }
    }

    /// Read from the current tree through this handle's raw node.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&FileState, RawNodeId) -> Result<R>) -> Result<R> {
        let state = self.file.borrow();
        let raw = state.resolve(self.id)?;
        f(&state, raw)
    }

    /// Resolve related raw nodes, then wrap them once the borrow is gone.
    pub(crate) fn related(
        &self,
        f: impl FnOnce(&FileState, RawNodeId) -> Vec<RawNodeId>,
    ) -> Result<Vec<Node>> {
        let raws = self.read(|state, raw| Ok(f(state, raw)))?;
        Ok(raws.into_iter().map(|raw| Node::wrap(&self.file, raw)).collect())
    }

    pub(crate) fn related_one(
        &self,
        f: impl FnOnce(&FileState, RawNodeId) -> Option<RawNodeId>,
    ) -> Result<Option<Node>> {
        let raw = self.read(|state, raw| Ok(f(state, raw)))?;
        Ok(raw.map(|raw| Node::wrap(&self.file, raw)))
    }

    /// Plan edits against the current text and apply them as one batch.
    ///
    /// This node must survive the edit.
    pub(crate) fn edit(
        &self,
        plan: impl FnOnce(&FileState, RawNodeId) -> Result<Vec<TextEdit>>,
    ) -> Result<()> {
        let mut state = self.file.borrow_mut();
        let raw = state.resolve(self.id)?;
        let edits = plan(&state, raw)?;
        state.apply_edits(edits, Some(raw))?;
        Ok(())
    }

    /// Like [`Node::edit`] for edits that delete this node.
    pub(crate) fn edit_detached(
        &self,
        plan: impl FnOnce(&FileState, RawNodeId) -> Result<Vec<TextEdit>>,
    ) -> Result<()> {
        let mut state = self.file.borrow_mut();
        let raw = state.resolve(self.id)?;
        let edits = plan(&state, raw)?;
        state.apply_edits(edits, None)?;
        Ok(())
    }

    /// Run several edits as one operation.
    ///
    /// When `f` fails the file returns to its state before the first edit,
    /// handles included. When it succeeds the edits count as one version.
    pub(crate) fn atomically<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let checkpoint = self.file.borrow().checkpoint();
        match f() {
            Ok(value) => {
                self.file.borrow_mut().settle(checkpoint);
                Ok(value)
            }
            Err(err) => {
                self.file.borrow_mut().restore(checkpoint);
                Err(err)
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.file.borrow().is_live(self.id)
    }

    pub fn kind(&self) -> Result<SyntaxKind> {
        self.read(|state, raw| {
            state
                .tree()
                .kind(raw)
                .ok_or(ManipulationError::InvalidatedNode)
        })
    }

    pub fn grammar_kind(&self) -> Result<&'static str> {
        self.read(|state, raw| {
            state
                .tree()
                .get(raw)
                .map(|n| n.grammar_kind)
                .ok_or(ManipulationError::InvalidatedNode)
        })
    }

    /// Current `[pos, end)`, read from the live tree.
    pub fn range(&self) -> Result<TextRange> {
        self.read(|state, raw| state.node_range(raw))
    }

    pub fn text(&self) -> Result<String> {
        self.read(|state, raw| Ok(state.node_text(raw).to_string()))
    }

    pub fn source_file(&self) -> SourceFile {
        SourceFile::from_shared(Rc::clone(&self.file))
    }

    pub fn parent(&self) -> Result<Option<Node>> {
        self.related_one(|state, raw| state.tree().parent(raw))
    }

    pub fn children(&self) -> Result<Vec<Node>> {
        self.related(|state, raw| state.tree().children(raw).collect())
    }

    /// Named children, without comments.
    pub fn named_children(&self) -> Result<Vec<Node>> {
        self.related(|state, raw| state.tree().named_children(raw).collect())
    }

    pub fn child_by_field(&self, field: &str) -> Result<Option<Node>> {
        self.related_one(|state, raw| state.tree().child_by_field(raw, field))
    }

    pub fn descendants(&self) -> Result<Vec<Node>> {
        self.related(|state, raw| state.tree().descendants(raw))
    }

    pub fn first_descendant_of_kind(&self, kind: SyntaxKind) -> Result<Option<Node>> {
        self.related_one(|state, raw| {
            state
                .tree()
                .descendants(raw)
                .into_iter()
                .find(|&d| state.tree().kind(d) == Some(kind))
        })
    }

    /// Kind-specific view of this node.
    pub fn view(&self) -> Result<NodeView> {
        let node = self.clone();
        Ok(match self.kind()? {
            SyntaxKind::ImportDeclaration => NodeView::ImportDeclaration(ImportDeclaration(node)),
            SyntaxKind::ImportSpecifier => NodeView::ImportSpecifier(ImportSpecifier(node)),
            SyntaxKind::ImportEqualsDeclaration => {
                NodeView::ImportEqualsDeclaration(ImportEqualsDeclaration(node))
            }
            SyntaxKind::VariableStatement => NodeView::VariableStatement(VariableStatement(node)),
            SyntaxKind::VariableDeclaration => {
                NodeView::VariableDeclaration(VariableDeclaration(node))
            }
            _ => NodeView::Other(node),
        })
    }

    /// Invalidate this handle and every cached handle below it.
    pub fn forget(&self) {
        self.file.borrow_mut().forget(self.id);
    }

    /// Replace this node's text, returning the node now spanning it.
    pub fn replace_with_text(&self, text: &str) -> Result<Option<Node>> {
        let pos = self.range()?.pos;
        self.edit_detached(|state, raw| {
            Ok(vec![TextEdit::replace(state.text(), state.node_range(raw)?, text)])
        })?;
        if text.is_empty() {
            return Ok(None);
        }
        let spanned = TextRange::new(pos, pos + text.len());
        let raw = self.file.borrow().tree().node_at_range(spanned);
        Ok(raw.map(|raw| Node::wrap(&self.file, raw)))
    }

    pub fn metadata(&self, key: &str) -> Result<Option<String>> {
        let state = self.file.borrow();
        state.resolve(self.id)?;
        Ok(state.wrappers().metadata(self.id, key).map(str::to_string))
    }

    /// Attach a value that follows this handle across edits.
    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let mut state = self.file.borrow_mut();
        if state
            .wrappers_mut()
            .set_metadata(self.id, key.into(), value.into())
        {
            Ok(())
        } else {
            Err(ManipulationError::InvalidatedNode)
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.file, &other.file) && self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.file) as usize).hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind(), self.range()) {
            (Ok(kind), Ok(range)) => write!(f, "Node({kind} {range})"),
            _ => write!(f, "Node(<invalidated>)"),
        }
    }
}

/// Closed set of kind-specific capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeView {
    ImportDeclaration(ImportDeclaration),
    ImportSpecifier(ImportSpecifier),
    ImportEqualsDeclaration(ImportEqualsDeclaration),
    VariableStatement(VariableStatement),
    VariableDeclaration(VariableDeclaration),
    Other(Node),
}

impl NodeView {
    pub fn node(&self) -> &Node {
        match self {
            NodeView::ImportDeclaration(v) => v,
            NodeView::ImportSpecifier(v) => v,
            NodeView::ImportEqualsDeclaration(v) => v,
            NodeView::VariableStatement(v) => v,
            NodeView::VariableDeclaration(v) => v,
            NodeView::Other(node) => node,
        }
    }
}

/// Declare a newtype view over [`Node`] for one [`SyntaxKind`].
macro_rules! node_view {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) crate::node::Node);

        impl $name {
            pub fn node(&self) -> &crate::node::Node {
                &self.0
            }

            pub fn into_node(self) -> crate::node::Node {
                self.0
            }
        }

        impl TryFrom<crate::node::Node> for $name {
            type Error = crate::manipulation::errors::ManipulationError;

            fn try_from(node: crate::node::Node) -> Result<Self, Self::Error> {
                let found = node.kind()?;
                if found == crate::syntax::SyntaxKind::$kind {
                    Ok(Self(node))
                } else {
                    Err(crate::manipulation::errors::ManipulationError::WrongKind {
                        expected: stringify!($kind),
                        found,
                    })
                }
            }
        }

        impl std::ops::Deref for $name {
            type Target = crate::node::Node;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }
    };
}

pub(crate) use node_view;
