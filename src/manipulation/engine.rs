use crate::binder::ReferenceFinder;
use crate::config::{self, FormattingSettings};
use crate::edit::{splice, validate_batch, TextEdit};
use crate::manipulation::errors::{ManipulationError, Result};
use crate::manipulation::remap;
use crate::node::cache::{WrapperCache, WrapperId};
use crate::range::TextRange;
use crate::syntax::{RawNodeId, SyntaxKind, SyntaxTree};
use crate::ts::SourceParser;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Text, tree, bindings and version captured by [`FileState::checkpoint`].
pub struct Checkpoint {
    text: String,
    tree: SyntaxTree,
    wrappers: WrapperCache,
    version: u64,
}

/// Synchronization state of one file: text, current tree and handle
/// bindings.
///
/// All three change together in [`FileState::apply_edits`] or not at all.
pub struct FileState {
    text: String,
    tree: SyntaxTree,
    wrappers: WrapperCache,
    parser: Box<dyn SourceParser>,
    binder: Box<dyn ReferenceFinder>,
    formatting: Option<FormattingSettings>,
    path: Option<PathBuf>,
    version: u64,
}

impl FileState {
    pub fn new(
        text: String,
        mut parser: Box<dyn SourceParser>,
        binder: Box<dyn ReferenceFinder>,
    ) -> Result<Self> {
        let tree = parser.parse(&text)?;
        Ok(Self {
            text,
            tree,
            wrappers: WrapperCache::new(),
            parser,
            binder,
            formatting: None,
            path: None,
            version: 0,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Number of committed edit batches. A settled run of batches counts once.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Per-file override, falling back to the process-wide settings.
    pub fn settings(&self) -> FormattingSettings {
        self.formatting
            .clone()
            .unwrap_or_else(config::global_settings)
    }

    pub fn set_formatting(&mut self, settings: Option<FormattingSettings>) {
        self.formatting = settings;
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    /// Raw node behind a handle.
    pub fn resolve(&self, id: WrapperId) -> Result<RawNodeId> {
        self.wrappers
            .raw_of(id)
            .ok_or(ManipulationError::InvalidatedNode)
    }

    pub fn wrap(&mut self, raw: RawNodeId) -> WrapperId {
        self.wrappers.get_or_create(raw)
    }

    pub fn forget(&mut self, id: WrapperId) {
        self.wrappers.forget(&self.tree, id);
    }

    pub fn is_live(&self, id: WrapperId) -> bool {
        self.wrappers.is_live(id)
    }

    pub fn wrappers(&self) -> &WrapperCache {
        &self.wrappers
    }

    pub fn wrappers_mut(&mut self) -> &mut WrapperCache {
        &mut self.wrappers
    }

    /// Text of a raw node of the current tree.
    pub fn node_text(&self, raw: RawNodeId) -> &str {
        self.tree.text(raw, &self.text)
    }

    pub fn node_range(&self, raw: RawNodeId) -> Result<TextRange> {
        self.tree
            .range(raw)
            .ok_or(ManipulationError::InvalidatedNode)
    }

    /// Apply one batch of planned edits.
    ///
    /// Edits are validated against the current text, spliced, reparsed and
    /// remapped. When `anchor` is given it must survive the edit, otherwise
    /// nothing is committed. Returns `false` when every edit was a no-op.
    pub fn apply_edits(&mut self, mut edits: Vec<TextEdit>, anchor: Option<RawNodeId>) -> Result<bool> {
        validate_batch(&self.text, &mut edits)?;
        edits.retain(|edit| !edit.is_noop(&self.text));
        if edits.is_empty() {
            trace!("edit batch is empty after dropping no-ops");
            return Ok(false);
        }
        for edit in &edits {
            trace!(range = %edit.range, new_text = ?edit.new_text, "planned edit");
        }

        let new_text = splice(&self.text, &edits);
        let new_tree = self.parser.parse(&new_text)?;
        let error_count = new_tree.error_nodes().len();
        if error_count > 0 {
            warn!(errors = error_count, "reparsed text contains syntax errors");
        }

        let pairs = remap::match_trees(&self.tree, &new_tree, &remap::spans_of(&edits));
        if let Some(anchor) = anchor {
            if !pairs.contains_key(&anchor) {
                let kind = self
                    .tree
                    .kind(anchor)
                    .map_or_else(|| "node".to_string(), |k| k.to_string());
                return Err(ManipulationError::NodeNoLongerExists {
                    message: format!("{kind} was not found in the reparsed tree"),
                });
            }
        }

        let plan = self.wrappers.plan_rebind(&pairs);
        debug!(
            edits = edits.len(),
            kept = plan.kept(),
            dropped = plan.dropped(),
            version = self.version + 1,
            "applied edit batch"
        );
        self.wrappers.commit_rebind(plan);
        self.text = new_text;
        self.tree = new_tree;
        self.version += 1;
        Ok(true)
    }

    /// Capture the current state so a run of batches can be undone as a
    /// whole.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            text: self.text.clone(),
            tree: self.tree.clone(),
            wrappers: self.wrappers.clone(),
            version: self.version,
        }
    }

    /// Undo every batch committed since `checkpoint` was taken.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        debug!(
            from = self.version,
            to = checkpoint.version,
            "rolled back to checkpoint"
        );
        self.text = checkpoint.text;
        self.tree = checkpoint.tree;
        self.wrappers.restore(checkpoint.wrappers);
        self.version = checkpoint.version;
    }

    /// Count the batches committed since `checkpoint` as one.
    pub fn settle(&mut self, checkpoint: Checkpoint) {
        if self.version > checkpoint.version {
            self.version = checkpoint.version + 1;
        }
    }

    /// Plan the reference-site replacements for renaming `declaration`.
    ///
    /// The declaration itself is not included. Shorthand properties keep
    /// their key and unaliased import specifiers gain an alias so that the
    /// surrounding code keeps its meaning.
    pub fn reference_edits(&self, declaration: RawNodeId, new_name: &str) -> Result<Vec<TextEdit>> {
        let sites = self
            .binder
            .find_references(&self.tree, &self.text, declaration)?;
        trace!(sites = sites.len(), new_name, "resolved reference sites");

        Ok(sites
            .into_iter()
            .map(|range| {
                let old = &self.text[range.as_range()];
                let rendered = if self.is_shorthand_site(range) {
                    format!("{old}: {new_name}")
                } else if self.is_unaliased_import_site(range) {
                    format!("{old} as {new_name}")
                } else {
                    new_name.to_string()
                };
                TextEdit::replace(&self.text, range, rendered)
            })
            .collect())
    }

    fn is_shorthand_site(&self, range: TextRange) -> bool {
        self.tree
            .find_node(range, "shorthand_property_identifier")
            .is_some()
    }

    fn is_unaliased_import_site(&self, range: TextRange) -> bool {
        let Some(id) = self.tree.find_node(range, "identifier") else {
            return false;
        };
        let Some(parent) = self.tree.parent(id) else {
            return false;
        };
        self.tree.kind(parent) == Some(SyntaxKind::ImportSpecifier)
            && self.tree.child_by_field(parent, "alias").is_none()
    }
}
