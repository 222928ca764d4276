//! Variable statement and declaration views.

use super::imports::remove_statement;
use super::{node_view, Node};
use crate::edit::TextEdit;
use crate::manipulation::engine::FileState;
use crate::manipulation::errors::{ManipulationError, Result};
use crate::range::{statement_removal_range, TextRange};
use crate::structure::printer::render_variable_declarations;
use crate::structure::{
    Structured, VariableDeclarationPatch, VariableDeclarationStructure, VariableStatementPatch,
    VariableStatementStructure,
};
use crate::syntax::{RawNodeId, SyntaxKind, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::fmt;

node_view!(
    /// `const`, `let` or `var` statement.
    VariableStatement => VariableStatement
);

node_view!(
    /// One `name: T = value` declarator of a variable statement.
    VariableDeclaration => VariableDeclaration
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

impl VariableDeclarationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            VariableDeclarationKind::Var => "var",
            VariableDeclarationKind::Let => "let",
            VariableDeclarationKind::Const => "const",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "var" => Some(VariableDeclarationKind::Var),
            "let" => Some(VariableDeclarationKind::Let),
            "const" => Some(VariableDeclarationKind::Const),
            _ => None,
        }
    }
}

impl fmt::Display for VariableDeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn missing(what: &'static str) -> ManipulationError {
    ManipulationError::MissingChild { what }
}

fn declarators(tree: &SyntaxTree, stmt: RawNodeId) -> Vec<RawNodeId> {
    tree.named_children(stmt)
        .filter(|&c| tree.kind(c) == Some(SyntaxKind::VariableDeclaration))
        .collect()
}

/// The leading `const`, `let` or `var` token.
fn keyword(tree: &SyntaxTree, stmt: RawNodeId) -> Option<RawNodeId> {
    tree.children(stmt).next().filter(|&c| {
        matches!(tree.kind(c), Some(SyntaxKind::Token("var" | "let" | "const")))
    })
}

fn read_kind(state: &FileState, stmt: RawNodeId) -> Result<VariableDeclarationKind> {
    let keyword = keyword(state.tree(), stmt).ok_or_else(|| missing("declaration keyword"))?;
    VariableDeclarationKind::from_keyword(state.node_text(keyword))
        .ok_or_else(|| missing("declaration keyword"))
}

#[derive(Debug, Clone, Copy)]
struct DeclarationParts {
    name: Option<RawNodeId>,
    /// `: T`, colon included
    type_annotation: Option<RawNodeId>,
    value: Option<RawNodeId>,
}

impl DeclarationParts {
    fn read(tree: &SyntaxTree, decl: RawNodeId) -> Self {
        Self {
            name: tree.child_by_field(decl, "name"),
            type_annotation: tree.child_by_field(decl, "type"),
            value: tree.child_by_field(decl, "value"),
        }
    }

    fn name(&self) -> Result<RawNodeId> {
        self.name.ok_or_else(|| missing("declaration name"))
    }

    /// End of the name, or of the type annotation when present.
    fn head_end(&self, state: &FileState) -> Result<usize> {
        match self.type_annotation {
            Some(ty) => Ok(state.node_range(ty)?.end),
            None => Ok(state.node_range(self.name()?)?.end),
        }
    }
}

fn read_declaration(state: &FileState, decl: RawNodeId) -> Result<VariableDeclarationStructure> {
    let tree = state.tree();
    let parts = DeclarationParts::read(tree, decl);
    let type_annotation = parts.type_annotation.map(|ty| {
        tree.named_children(ty)
            .next()
            .map_or_else(|| state.node_text(ty), |inner| state.node_text(inner))
            .to_string()
    });
    Ok(VariableDeclarationStructure {
        name: state.node_text(parts.name()?).to_string(),
        type_annotation,
        initializer: parts.value.map(|v| state.node_text(v).to_string()),
    })
}

fn plan_initializer(state: &FileState, decl: RawNodeId, value: Option<&str>) -> Result<Vec<TextEdit>> {
    let parts = DeclarationParts::read(state.tree(), decl);
    let text = state.text();
    match (value, parts.value) {
        (Some(value), _) if value.trim().is_empty() => Err(ManipulationError::argument_range(
            "initializer text cannot be blank",
        )),
        (Some(value), Some(existing)) => Ok(vec![TextEdit::replace(
            text,
            state.node_range(existing)?,
            value,
        )]),
        (Some(value), None) => Ok(vec![TextEdit::insert(
            text,
            parts.head_end(state)?,
            format!(" = {value}"),
        )]),
        (None, Some(existing)) => {
            let span = TextRange::new(parts.head_end(state)?, state.node_range(existing)?.end);
            Ok(vec![TextEdit::delete(text, span)])
        }
        (None, None) => Ok(Vec::new()),
    }
}

fn plan_type(state: &FileState, decl: RawNodeId, ty: Option<&str>) -> Result<Vec<TextEdit>> {
    let parts = DeclarationParts::read(state.tree(), decl);
    let name_end = state.node_range(parts.name()?)?.end;
    let text = state.text();
    match (ty.map(str::trim).filter(|t| !t.is_empty()), parts.type_annotation) {
        (Some(ty), Some(existing)) => Ok(vec![TextEdit::replace(
            text,
            state.node_range(existing)?,
            format!(": {ty}"),
        )]),
        (Some(ty), None) => Ok(vec![TextEdit::insert(text, name_end, format!(": {ty}"))]),
        (None, Some(existing)) => {
            let span = TextRange::new(name_end, state.node_range(existing)?.end);
            Ok(vec![TextEdit::delete(text, span)])
        }
        (None, None) => Ok(Vec::new()),
    }
}

/// Remove one declarator with its separating comma.
fn plan_remove_declaration(state: &FileState, decl: RawNodeId) -> Result<Vec<TextEdit>> {
    let tree = state.tree();
    let stmt = tree.parent(decl).ok_or_else(|| missing("variable statement"))?;
    let siblings = declarators(tree, stmt);
    let index = siblings
        .iter()
        .position(|&d| d == decl)
        .ok_or_else(|| missing("declaration in its statement"))?;

    let span = match (index.checked_sub(1), siblings.get(index + 1)) {
        (_, Some(&next)) => TextRange::new(state.node_range(decl)?.pos, state.node_range(next)?.pos),
        (Some(prev), None) => TextRange::new(
            state.node_range(siblings[prev])?.end,
            state.node_range(decl)?.end,
        ),
        (None, None) => {
            let range = state.node_range(stmt)?;
            statement_removal_range(state.text(), range)
        }
    };
    Ok(vec![TextEdit::delete(state.text(), span)])
}

impl VariableStatement {
    pub fn declaration_kind(&self) -> Result<VariableDeclarationKind> {
        self.read(read_kind)
    }

    pub fn set_declaration_kind(&self, kind: VariableDeclarationKind) -> Result<()> {
        self.edit(|state, raw| {
            let keyword = keyword(state.tree(), raw).ok_or_else(|| missing("declaration keyword"))?;
            Ok(vec![TextEdit::replace(
                state.text(),
                state.node_range(keyword)?,
                kind.as_str(),
            )])
        })
    }

    pub fn declarations(&self) -> Result<Vec<VariableDeclaration>> {
        let decls = self.related(|state, raw| declarators(state.tree(), raw))?;
        Ok(decls.into_iter().map(VariableDeclaration).collect())
    }

    pub fn remove(&self) -> Result<()> {
        remove_statement(self)
    }
}

impl Structured for VariableStatement {
    type Structure = VariableStatementStructure;
    type Patch = VariableStatementPatch;

    fn structure(&self) -> Result<VariableStatementStructure> {
        self.read(|state, raw| {
            Ok(VariableStatementStructure {
                declaration_kind: read_kind(state, raw)?,
                declarations: declarators(state.tree(), raw)
                    .into_iter()
                    .map(|d| read_declaration(state, d))
                    .collect::<Result<_>>()?,
            })
        })
    }

    fn set(&self, patch: &VariableStatementPatch) -> Result<()> {
        self.atomically(|| {
            let current = self.structure()?;
            if let Some(decls) = &patch.declarations {
                if decls.is_empty() {
                    return Err(ManipulationError::conflict(
                        "a variable statement needs at least one declaration",
                    ));
                }
            }

            if let Some(kind) = patch.declaration_kind {
                if kind != current.declaration_kind {
                    self.set_declaration_kind(kind)?;
                }
            }
            if let Some(decls) = &patch.declarations {
                if *decls != current.declarations {
                    self.edit(|state, raw| {
                        let all = declarators(state.tree(), raw);
                        let (Some(&first), Some(&last)) = (all.first(), all.last()) else {
                            return Err(missing("variable declaration"));
                        };
                        let span = TextRange::new(state.node_range(first)?.pos, state.node_range(last)?.end);
                        Ok(vec![TextEdit::replace(
                            state.text(),
                            span,
                            render_variable_declarations(decls),
                        )])
                    })?;
                }
            }
            Ok(())
        })
    }
}

impl VariableDeclaration {
    pub fn name(&self) -> Result<String> {
        self.read(|state, raw| {
            let name = DeclarationParts::read(state.tree(), raw).name()?;
            Ok(state.node_text(name).to_string())
        })
    }

    pub fn name_node(&self) -> Result<Node> {
        self.related_one(|state, raw| DeclarationParts::read(state.tree(), raw).name)?
            .ok_or_else(|| missing("declaration name"))
    }

    /// Replace the name without touching references.
    pub fn set_name(&self, name: &str) -> Result<()> {
        self.edit(|state, raw| {
            let node = DeclarationParts::read(state.tree(), raw).name()?;
            Ok(vec![TextEdit::replace(state.text(), state.node_range(node)?, name)])
        })
    }

    /// Rename the declaration and all of its references in one batch.
    pub fn rename(&self, name: &str) -> Result<()> {
        self.edit(|state, raw| {
            let node = DeclarationParts::read(state.tree(), raw).name()?;
            let mut edits = vec![TextEdit::replace(state.text(), state.node_range(node)?, name)];
            edits.extend(state.reference_edits(node, name)?);
            Ok(edits)
        })
    }

    /// Type annotation text without the colon.
    pub fn type_annotation(&self) -> Result<Option<String>> {
        Ok(self.structure()?.type_annotation)
    }

    pub fn set_type(&self, ty: &str) -> Result<()> {
        self.edit(|state, raw| plan_type(state, raw, Some(ty)))
    }

    pub fn remove_type(&self) -> Result<()> {
        self.edit(|state, raw| plan_type(state, raw, None))
    }

    pub fn initializer(&self) -> Result<Option<Node>> {
        self.related_one(|state, raw| DeclarationParts::read(state.tree(), raw).value)
    }

    pub fn set_initializer(&self, text: &str) -> Result<()> {
        self.edit(|state, raw| plan_initializer(state, raw, Some(text)))
    }

    pub fn remove_initializer(&self) -> Result<()> {
        self.edit(|state, raw| plan_initializer(state, raw, None))
    }

    pub fn variable_statement(&self) -> Result<VariableStatement> {
        let stmt = self.related_one(|state, raw| state.tree().parent(raw))?;
        VariableStatement::try_from(stmt.ok_or_else(|| missing("variable statement"))?)
    }

    /// Remove this declarator; the last one takes the statement with it.
    pub fn remove(&self) -> Result<()> {
        self.edit_detached(plan_remove_declaration)
    }
}

impl Structured for VariableDeclaration {
    type Structure = VariableDeclarationStructure;
    type Patch = VariableDeclarationPatch;

    fn structure(&self) -> Result<VariableDeclarationStructure> {
        self.read(read_declaration)
    }

    fn set(&self, patch: &VariableDeclarationPatch) -> Result<()> {
        self.atomically(|| {
            let current = self.structure()?;
            if let Some(name) = &patch.name {
                if *name != current.name {
                    self.set_name(name)?;
                }
            }
            if let Some(ty) = &patch.type_annotation {
                if *ty != current.type_annotation {
                    self.edit(|state, raw| plan_type(state, raw, ty.as_deref()))?;
                }
            }
            if let Some(init) = &patch.initializer {
                if *init != current.initializer {
                    self.edit(|state, raw| plan_initializer(state, raw, init.as_deref()))?;
                }
            }
            Ok(())
        })
    }
}
