//! Identity bookkeeping between raw nodes and caller-held handles.

use crate::syntax::{RawNodeId, SyntaxTree};
use std::collections::{BTreeMap, HashMap};

/// Stable identity of one handle; never reused within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WrapperId(u64);

#[derive(Debug, Clone)]
struct Slot {
    raw: RawNodeId,
    metadata: BTreeMap<String, String>,
}

/// Wrapper moves computed after a reparse, applied with
/// [`WrapperCache::commit_rebind`].
#[derive(Debug, Default)]
pub struct RebindPlan {
    moves: Vec<(WrapperId, RawNodeId)>,
    dropped: Vec<WrapperId>,
}

impl RebindPlan {
    pub fn kept(&self) -> usize {
        self.moves.len()
    }

    pub fn dropped(&self) -> usize {
        self.dropped.len()
    }
}

/// One-to-one mapping of live raw nodes to wrappers, populated lazily.
#[derive(Debug, Default, Clone)]
pub struct WrapperCache {
    by_raw: HashMap<RawNodeId, WrapperId>,
    slots: HashMap<WrapperId, Slot>,
    next: u64,
}

impl WrapperCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrapper for `raw`, created on first request.
    pub fn get_or_create(&mut self, raw: RawNodeId) -> WrapperId {
        if let Some(&id) = self.by_raw.get(&raw) {
            return id;
        }
        let id = WrapperId(self.next);
        self.next += 1;
        self.by_raw.insert(raw, id);
        self.slots.insert(
            id,
            Slot {
                raw,
                metadata: BTreeMap::new(),
            },
        );
        id
    }

    /// Raw node currently behind `id`, or `None` once invalidated.
    pub fn raw_of(&self, id: WrapperId) -> Option<RawNodeId> {
        self.slots.get(&id).map(|slot| slot.raw)
    }

    /// Return to the bindings of `saved`.
    ///
    /// Wrappers created since `saved` was taken become dead; their ids are
    /// still never handed out again.
    pub fn restore(&mut self, saved: WrapperCache) {
        let next = self.next.max(saved.next);
        *self = saved;
        self.next = next;
    }

    pub fn is_live(&self, id: WrapperId) -> bool {
        self.slots.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Invalidate `id` and every cached wrapper below its raw node.
    ///
    /// Ancestors are untouched. Forgetting twice is a no-op.
    pub fn forget(&mut self, tree: &SyntaxTree, id: WrapperId) {
        let Some(slot) = self.slots.remove(&id) else {
            return;
        };
        self.by_raw.remove(&slot.raw);

        for below in tree.descendants(slot.raw) {
            if let Some(child) = self.by_raw.remove(&below) {
                self.slots.remove(&child);
            }
        }
    }

    /// Work out where each wrapper lands given old-to-new node pairs.
    pub fn plan_rebind(&self, pairs: &HashMap<RawNodeId, RawNodeId>) -> RebindPlan {
        let mut plan = RebindPlan::default();
        for (&id, slot) in &self.slots {
            match pairs.get(&slot.raw) {
                Some(&new_raw) => plan.moves.push((id, new_raw)),
                None => plan.dropped.push(id),
            }
        }
        plan
    }

    pub fn commit_rebind(&mut self, plan: RebindPlan) {
        for id in plan.dropped {
            self.slots.remove(&id);
        }
        self.by_raw.clear();
        for (id, raw) in plan.moves {
            if let Some(slot) = self.slots.get_mut(&id) {
                slot.raw = raw;
                self.by_raw.insert(raw, id);
            }
        }
    }

    pub fn metadata(&self, id: WrapperId, key: &str) -> Option<&str> {
        self.slots.get(&id)?.metadata.get(key).map(String::as_str)
    }

    /// Attach a value to a live wrapper; returns false if it is invalid.
    pub fn set_metadata(&mut self, id: WrapperId, key: String, value: String) -> bool {
        match self.slots.get_mut(&id) {
            Some(slot) => {
                slot.metadata.insert(key, value);
                true
            }
            None => false,
        }
    }
}
