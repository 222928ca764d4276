//! The caller-facing source file.

use crate::binder::{LexicalBinder, ReferenceFinder};
use crate::config::FormattingSettings;
use crate::edit::{atomic_write, TextEdit};
use crate::manipulation::engine::FileState;
use crate::manipulation::errors::{ManipulationError, Result};
use crate::node::{ImportDeclaration, ImportEqualsDeclaration, Node, NodeView, VariableStatement};
use crate::range::{statement_removal_range, TextRange};
use crate::sg::PatternMatcher;
use crate::structure::printer::{render_import_declaration, render_structure};
use crate::structure::{
    ImportDeclarationStructure, SourceFilePatch, SourceFileStructure, Structure, Structured,
};
use crate::syntax::RawNodeId;
use crate::ts::{syntax_errors, PooledParser, SourceParser, SyntaxErrorSpan};
use similar::{capture_diff_slices, Algorithm, DiffOp};
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// A parsed TypeScript file and the handles issued for it.
///
/// Cloning is cheap and yields another handle to the same file.
#[derive(Clone)]
pub struct SourceFile {
    state: Rc<RefCell<FileState>>,
}

impl SourceFile {
    /// Parse `text` with the pooled TypeScript parser and the lexical binder.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        Self::with_parts(text, Box::new(PooledParser), Box::new(LexicalBinder))
    }

    pub fn with_parts(
        text: impl Into<String>,
        parser: Box<dyn SourceParser>,
        binder: Box<dyn ReferenceFinder>,
    ) -> Result<Self> {
        let state = FileState::new(text.into(), parser, binder)?;
        Ok(Self::from_shared(Rc::new(RefCell::new(state))))
    }

    pub(crate) fn from_shared(state: Rc<RefCell<FileState>>) -> Self {
        Self { state }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManipulationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = Self::new(text)?;
        file.state.borrow_mut().set_path(Some(path.to_path_buf()));
        debug!(path = %path.display(), "loaded source file");
        Ok(file)
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.state.borrow().path().map(Path::to_path_buf)
    }

    /// Write the current text back to this file's path atomically.
    pub fn save(&self) -> Result<()> {
        let state = self.state.borrow();
        let path = state.path().ok_or(ManipulationError::NoPath)?;
        atomic_write(path, state.text().as_bytes())?;
        debug!(path = %path.display(), version = state.version(), "saved source file");
        Ok(())
    }

    /// Save to `path` and remember it for later saves.
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<()> {
        self.state
            .borrow_mut()
            .set_path(Some(path.as_ref().to_path_buf()));
        self.save()
    }

    pub fn full_text(&self) -> String {
        self.state.borrow().text().to_string()
    }

    /// Number of edit batches applied so far.
    pub fn version(&self) -> u64 {
        self.state.borrow().version()
    }

    /// Settings in effect for this file.
    pub fn formatting(&self) -> FormattingSettings {
        self.state.borrow().settings()
    }

    /// Override the process-wide settings for this file; `None` reverts.
    pub fn set_formatting(&self, settings: Option<FormattingSettings>) {
        self.state.borrow_mut().set_formatting(settings);
    }

    pub fn syntax_errors(&self) -> Vec<SyntaxErrorSpan> {
        syntax_errors(self.state.borrow().tree())
    }

    pub fn root(&self) -> Node {
        let root = self.state.borrow().tree().root();
        Node::wrap(&self.state, root)
    }

    fn wrap_all(&self, raws: Vec<RawNodeId>) -> Vec<Node> {
        raws.into_iter()
            .map(|raw| Node::wrap(&self.state, raw))
            .collect()
    }

    /// Top-level statements in source order.
    pub fn statements(&self) -> Vec<Node> {
        let raws: Vec<RawNodeId> = {
            let state = self.state.borrow();
            state.tree().named_children(state.tree().root()).collect()
        };
        self.wrap_all(raws)
    }

    pub fn import_declarations(&self) -> Result<Vec<ImportDeclaration>> {
        Ok(self
            .views()?
            .into_iter()
            .filter_map(|v| match v {
                NodeView::ImportDeclaration(decl) => Some(decl),
                _ => None,
            })
            .collect())
    }

    pub fn import_equals_declarations(&self) -> Result<Vec<ImportEqualsDeclaration>> {
        Ok(self
            .views()?
            .into_iter()
            .filter_map(|v| match v {
                NodeView::ImportEqualsDeclaration(decl) => Some(decl),
                _ => None,
            })
            .collect())
    }

    pub fn variable_statements(&self) -> Result<Vec<VariableStatement>> {
        Ok(self
            .views()?
            .into_iter()
            .filter_map(|v| match v {
                NodeView::VariableStatement(stmt) => Some(stmt),
                _ => None,
            })
            .collect())
    }

    fn views(&self) -> Result<Vec<NodeView>> {
        self.statements().iter().map(Node::view).collect()
    }

    /// Insert an import as the `index`-th import declaration.
    pub fn insert_import_declaration(
        &self,
        index: usize,
        structure: &ImportDeclarationStructure,
    ) -> Result<ImportDeclaration> {
        let imports = self.import_declarations()?;
        if index > imports.len() {
            return Err(ManipulationError::argument_range(format!(
                "insert index {index} is outside 0..={}",
                imports.len()
            )));
        }
        let anchor = match imports.get(index) {
            Some(next) => Some((next.range()?.pos, true)),
            None => imports.last().map(|last| last.range()).transpose()?.map(|r| (r.end, false)),
        };

        self.apply(|state| {
            let settings = state.settings();
            let nl = settings.new_line();
            let rendered = render_import_declaration(structure, &settings)?;
            let edit = match anchor {
                Some((pos, true)) => TextEdit::insert(state.text(), pos, format!("{rendered}{nl}")),
                Some((pos, false)) => TextEdit::insert(state.text(), pos, format!("{nl}{rendered}")),
                None => TextEdit::insert(state.text(), 0, format!("{rendered}{nl}")),
            };
            Ok(vec![edit])
        })?;

        self.import_declarations()?
            .into_iter()
            .nth(index)
            .ok_or(ManipulationError::MissingChild {
                what: "inserted import declaration",
            })
    }

    /// Insert an import after the last existing one.
    pub fn add_import_declaration(&self, structure: &ImportDeclarationStructure) -> Result<ImportDeclaration> {
        let len = self.import_declarations()?.len();
        self.insert_import_declaration(len, structure)
    }

    /// Replace a raw range of text; handles inside it are invalidated.
    pub fn replace_text(&self, range: TextRange, text: &str) -> Result<()> {
        self.apply(|state| Ok(vec![TextEdit::replace(state.text(), range, text)]))
    }

    pub fn insert_text(&self, pos: usize, text: &str) -> Result<()> {
        self.replace_text(TextRange::empty(pos), text)
    }

    pub fn remove_text(&self, range: TextRange) -> Result<()> {
        self.replace_text(range, "")
    }

    /// Nodes matching an ast-grep pattern such as `console.log($$$ARGS)`.
    pub fn find_nodes(&self, pattern: &str) -> Result<Vec<Node>> {
        let matches = PatternMatcher::new(&self.full_text()).find_all(pattern)?;
        let raws: Vec<RawNodeId> = {
            let state = self.state.borrow();
            matches
                .iter()
                .filter_map(|m| state.tree().find_node(m.range, &m.kind))
                .collect()
        };
        Ok(self.wrap_all(raws))
    }

    /// The single node matching `pattern`.
    ///
    /// Fails with a pattern error when there is no match or more than one.
    pub fn find_node(&self, pattern: &str) -> Result<Node> {
        let found = PatternMatcher::new(&self.full_text()).find_unique(pattern)?;
        let raw = self
            .state
            .borrow()
            .tree()
            .find_node(found.range, &found.kind)
            .ok_or(ManipulationError::MissingChild {
                what: "node for pattern match",
            })?;
        Ok(Node::wrap(&self.state, raw))
    }

    fn apply(&self, plan: impl FnOnce(&FileState) -> Result<Vec<TextEdit>>) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let edits = plan(&state)?;
        state.apply_edits(edits, None)?;
        Ok(())
    }
}

fn structure_of(view: &NodeView) -> Result<Structure> {
    Ok(match view {
        NodeView::ImportDeclaration(decl) => decl.structure()?.into(),
        NodeView::ImportEqualsDeclaration(decl) => decl.structure()?.into(),
        NodeView::VariableStatement(stmt) => stmt.structure()?.into(),
        other => Structure::Statement {
            text: other.node().text()?,
        },
    })
}

impl Structured for SourceFile {
    type Structure = SourceFileStructure;
    type Patch = SourceFilePatch;

    fn structure(&self) -> Result<SourceFileStructure> {
        Ok(SourceFileStructure {
            statements: self.views()?.iter().map(structure_of).collect::<Result<_>>()?,
        })
    }

    /// Rewrite only the runs of statements whose descriptors changed.
    fn set(&self, patch: &SourceFilePatch) -> Result<()> {
        let Some(wanted) = &patch.statements else {
            return Ok(());
        };
        let current = self.structure()?.statements;
        if current == *wanted {
            return Ok(());
        }
        let ranges = self
            .statements()
            .iter()
            .map(Node::range)
            .collect::<Result<Vec<_>>>()?;
        let ops = capture_diff_slices(Algorithm::Myers, &current, wanted);

        self.apply(|state| {
            let settings = state.settings();
            let nl = settings.new_line();
            let text = state.text();
            let render = |items: &[Structure]| -> Result<String> {
                Ok(items
                    .iter()
                    .map(|s| render_structure(s, &settings))
                    .collect::<Result<Vec<_>>>()?
                    .join(nl))
            };

            let mut edits = Vec::new();
            for op in &ops {
                match *op {
                    DiffOp::Equal { .. } => {}
                    DiffOp::Delete { old_index, old_len, .. } => {
                        let last = statement_removal_range(text, ranges[old_index + old_len - 1]);
                        let span = TextRange::new(ranges[old_index].pos, last.end);
                        edits.push(TextEdit::delete(text, span));
                    }
                    DiffOp::Insert { old_index, new_index, new_len } => {
                        let rendered = render(&wanted[new_index..new_index + new_len])?;
                        let edit = match ranges.get(old_index) {
                            Some(next) => TextEdit::insert(text, next.pos, format!("{rendered}{nl}")),
                            None => {
                                let sep = if text.is_empty() || text.ends_with('\n') { "" } else { nl };
                                TextEdit::insert(text, text.len(), format!("{sep}{rendered}{nl}"))
                            }
                        };
                        edits.push(edit);
                    }
                    DiffOp::Replace { old_index, old_len, new_index, new_len } => {
                        let rendered = render(&wanted[new_index..new_index + new_len])?;
                        let span = TextRange::new(ranges[old_index].pos, ranges[old_index + old_len - 1].end);
                        edits.push(TextEdit::replace(text, span, rendered));
                    }
                }
            }
            Ok(edits)
        })
    }
}

impl fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SourceFile")
            .field("path", &state.path())
            .field("version", &state.version())
            .field("len", &state.text().len())
            .finish()
    }
}
