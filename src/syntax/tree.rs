use crate::range::TextRange;
use crate::syntax::kind::SyntaxKind;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

/// Identity of a raw node: the parse it came from plus its arena slot.
///
/// Every parse gets a fresh generation, so an id from an old tree never
/// resolves in a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawNodeId {
    generation: u32,
    index: u32,
}

impl RawNodeId {
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Immutable node of one parse.
#[derive(Debug, Clone)]
pub struct RawNode {
    pub kind: SyntaxKind,
    /// Grammar kind as reported by the parser
    pub grammar_kind: &'static str,
    pub range: TextRange,
    /// Field name this node occupies in its parent, if any
    pub field: Option<&'static str>,
    pub named: bool,
    /// ERROR or MISSING node
    pub is_error: bool,
    /// Extra node such as a comment
    pub is_extra: bool,
    parent: Option<u32>,
    children: Vec<u32>,
}

/// Arena holding the raw nodes of one parse pass.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    generation: u32,
    nodes: Vec<RawNode>,
}

impl SyntaxTree {
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn root(&self) -> RawNodeId {
        self.id(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn id(&self, index: u32) -> RawNodeId {
        RawNodeId {
            generation: self.generation,
            index,
        }
    }

    /// Resolve an id, returning `None` for ids of any other parse.
    pub fn get(&self, id: RawNodeId) -> Option<&RawNode> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get(id.index as usize)
    }

    pub fn contains(&self, id: RawNodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn kind(&self, id: RawNodeId) -> Option<SyntaxKind> {
        self.get(id).map(|n| n.kind)
    }

    pub fn range(&self, id: RawNodeId) -> Option<TextRange> {
        self.get(id).map(|n| n.range)
    }

    /// Source text covered by `id`.
    pub fn text<'a>(&self, id: RawNodeId, source: &'a str) -> &'a str {
        self.get(id)
            .and_then(|n| source.get(n.range.as_range()))
            .unwrap_or_default()
    }

    pub fn parent(&self, id: RawNodeId) -> Option<RawNodeId> {
        self.get(id)?.parent.map(|p| self.id(p))
    }

    pub fn children(&self, id: RawNodeId) -> impl Iterator<Item = RawNodeId> + '_ {
        self.get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&c| self.id(c))
    }

    /// Named children, skipping comments.
    pub fn named_children(&self, id: RawNodeId) -> impl Iterator<Item = RawNodeId> + '_ {
        self.children(id).filter(move |&c| {
            self.get(c)
                .is_some_and(|n| n.named && !n.is_extra && n.kind != SyntaxKind::Comment)
        })
    }

    pub fn child_by_field(&self, id: RawNodeId, field: &str) -> Option<RawNodeId> {
        self.children(id)
            .find(|&c| self.get(c).and_then(|n| n.field) == Some(field))
    }

    pub fn first_child_of_kind(&self, id: RawNodeId, kind: SyntaxKind) -> Option<RawNodeId> {
        self.children(id).find(|&c| self.kind(c) == Some(kind))
    }

    /// First anonymous child whose grammar kind is exactly `token`.
    pub fn token(&self, id: RawNodeId, token: &str) -> Option<RawNodeId> {
        self.children(id)
            .find(|&c| matches!(self.kind(c), Some(SyntaxKind::Token(t)) if t == token))
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: RawNodeId) -> Vec<RawNodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<RawNodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut kids: Vec<RawNodeId> = self.children(next).collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// True when `id` is `ancestor` or lies beneath it.
    pub fn is_descendant_of(&self, id: RawNodeId, ancestor: RawNodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Outermost non-root node spanning exactly `range`.
    pub fn node_at_range(&self, range: TextRange) -> Option<RawNodeId> {
        let mut current = self.root();
        loop {
            let next = self.children(current).find(|&c| {
                self.range(c)
                    .is_some_and(|r| r.contains_range(range) && !(r.is_empty() && !range.is_empty()))
            })?;
            if self.range(next) == Some(range) {
                return Some(next);
            }
            current = next;
        }
    }

    /// Node with exactly `range` and grammar kind `grammar_kind`.
    pub fn find_node(&self, range: TextRange, grammar_kind: &str) -> Option<RawNodeId> {
        std::iter::once(self.root())
            .chain(self.descendants(self.root()))
            .find(|&id| {
                self.get(id)
                    .is_some_and(|n| n.range == range && n.grammar_kind == grammar_kind)
            })
    }

    /// ERROR and MISSING nodes in source order.
    pub fn error_nodes(&self) -> Vec<RawNodeId> {
        std::iter::once(self.root())
            .chain(self.descendants(self.root()))
            .filter(|&id| self.get(id).is_some_and(|n| n.is_error))
            .collect()
    }
}

/// Incremental builder used by parser front-ends.
#[derive(Debug)]
pub struct SyntaxTreeBuilder {
    generation: u32,
    nodes: Vec<RawNode>,
}

/// Parser-reported facts about one node.
#[derive(Debug, Clone, Copy)]
pub struct NodeFacts {
    pub grammar_kind: &'static str,
    pub range: TextRange,
    pub field: Option<&'static str>,
    pub named: bool,
    pub is_error: bool,
    pub is_extra: bool,
}

impl SyntaxTreeBuilder {
    pub fn new() -> Self {
        Self {
            generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
        }
    }

    /// Open a node under `parent`; returns its slot.
    ///
    /// The kind is provisional until [`SyntaxTreeBuilder::finish_node`]
    /// classifies it from its children.
    pub fn start_node(&mut self, facts: NodeFacts, parent: Option<u32>) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(RawNode {
            kind: SyntaxKind::Other(facts.grammar_kind),
            grammar_kind: facts.grammar_kind,
            range: facts.range,
            field: facts.field,
            named: facts.named,
            is_error: facts.is_error,
            is_extra: facts.is_extra,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.nodes[p as usize].children.push(index);
        }
        index
    }

    /// Classify a node once all of its children have been added.
    pub fn finish_node(&mut self, index: u32) {
        let child_kinds: Vec<&'static str> = self.nodes[index as usize]
            .children
            .iter()
            .map(|&c| self.nodes[c as usize].grammar_kind)
            .collect();
        let node = &mut self.nodes[index as usize];
        node.kind = SyntaxKind::classify(node.grammar_kind, node.named, &child_kinds);
    }

    pub fn finish(self) -> SyntaxTree {
        SyntaxTree {
            generation: self.generation,
            nodes: self.nodes,
        }
    }
}

impl Default for SyntaxTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn facts(kind: &'static str, pos: usize, end: usize, named: bool) -> NodeFacts {
        NodeFacts {
            grammar_kind: kind,
            range: TextRange::new(pos, end),
            field: None,
            named,
            is_error: false,
            is_extra: false,
        }
    }

    /// `import "m";` built by hand.
    fn side_effect_import() -> SyntaxTree {
        let mut b = SyntaxTreeBuilder::new();
        let program = b.start_node(facts("program", 0, 11, true), None);
        let stmt = b.start_node(facts("import_statement", 0, 11, true), Some(program));
        let kw = b.start_node(facts("import", 0, 6, false), Some(stmt));
        b.finish_node(kw);
        let string = b.start_node(
            NodeFacts {
                field: Some("source"),
                ..facts("string", 7, 10, true)
            },
            Some(stmt),
        );
        b.finish_node(string);
        let semi = b.start_node(facts(";", 10, 11, false), Some(stmt));
        b.finish_node(semi);
        b.finish_node(stmt);
        b.finish_node(program);
        b.finish()
    }

    #[test]
    fn navigation() {
        let tree = side_effect_import();
        let root = tree.root();
        assert_eq!(tree.kind(root), Some(SyntaxKind::SourceFile));

        let stmt = tree.named_children(root).next().unwrap();
        assert_eq!(tree.kind(stmt), Some(SyntaxKind::ImportDeclaration));
        assert_eq!(tree.parent(stmt), Some(root));

        let source = tree.child_by_field(stmt, "source").unwrap();
        assert_eq!(tree.text(source, "import \"m\";"), "\"m\"");
        assert!(tree.token(stmt, "import").is_some());
        assert!(tree.token(stmt, "from").is_none());
        assert_eq!(tree.descendants(root).len(), 4);
        assert!(tree.is_descendant_of(source, root));
        assert_eq!(tree.node_at_range(TextRange::new(7, 10)), Some(source));
        assert_eq!(tree.node_at_range(TextRange::new(0, 11)), Some(stmt));
    }

    #[test]
    fn ids_do_not_cross_generations() {
        let first = side_effect_import();
        let second = side_effect_import();
        assert_ne!(first.generation(), second.generation());
        assert!(second.get(first.root()).is_none());
        assert!(first.contains(first.root()));
    }
}
