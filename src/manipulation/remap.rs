//! Old-tree to new-tree node matching after a text edit.
//!
//! Matching walks both trees from the root. Each old child is placed
//! relative to the edited spans and, unless the edit destroyed it, paired
//! with the first unclaimed new sibling of the same kind at the predicted
//! position. Nodes whose old range was rewritten wholesale are matched but
//! not descended into.

use crate::edit::TextEdit;
use crate::range::TextRange;
use crate::syntax::{RawNodeId, SyntaxTree};
use std::collections::HashMap;

/// One applied edit in old-text coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSpan {
    pub start: usize,
    pub old_end: usize,
    pub new_len: usize,
}

impl EditSpan {
    fn delta(&self) -> isize {
        self.new_len as isize - (self.old_end - self.start) as isize
    }

    fn is_insertion_at(&self, pos: usize) -> bool {
        self.start == pos && self.old_end == pos
    }
}

/// Spans of a validated batch, ascending by start.
pub fn spans_of(edits: &[TextEdit]) -> Vec<EditSpan> {
    let mut spans: Vec<EditSpan> = edits
        .iter()
        .map(|edit| EditSpan {
            start: edit.range.pos,
            old_end: edit.range.end,
            new_len: edit.new_text.len(),
        })
        .collect();
    spans.sort_by_key(|s| (s.start, s.old_end));
    spans
}

/// Where a node ends up after the edit.
///
/// Insertions exactly at a node boundary may land inside or outside the
/// node, so both offsets are kept as candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Kept {
        starts: [usize; 2],
        ends: [usize; 2],
    },
    Replaced {
        starts: [usize; 2],
        len: usize,
    },
    Lost,
}

fn offset(pos: usize, delta: isize) -> usize {
    (pos as isize + delta).max(0) as usize
}

fn place(range: TextRange, spans: &[EditSpan]) -> Placement {
    let (a, b) = (range.pos, range.end);
    let mut before = 0isize;
    let mut at_start = 0isize;
    let mut inside_or_before = 0isize;
    let mut at_end = 0isize;
    let mut replaced_len = None;

    for span in spans {
        let delta = span.delta();
        if span.is_insertion_at(a) {
            at_start += delta;
            if a < b {
                inside_or_before += delta;
            } else {
                at_end += delta;
            }
            continue;
        }
        if span.old_end <= a {
            before += delta;
            inside_or_before += delta;
            continue;
        }
        if span.is_insertion_at(b) {
            at_end += delta;
            continue;
        }
        if span.start >= b {
            continue;
        }
        if span.start == a && span.old_end == b {
            if replaced_len.is_some() {
                return Placement::Lost;
            }
            replaced_len = Some(span.new_len);
            continue;
        }
        if a <= span.start && span.old_end <= b {
            inside_or_before += delta;
            continue;
        }
        return Placement::Lost;
    }

    let starts = [offset(a, before), offset(a, before + at_start)];
    match replaced_len {
        Some(len) => Placement::Replaced { starts, len },
        None => Placement::Kept {
            starts,
            ends: [offset(b, inside_or_before), offset(b, inside_or_before + at_end)],
        },
    }
}

/// Pair every surviving old node with its counterpart in `new`.
///
/// The roots are always paired. Old nodes absent from the returned map have
/// no counterpart and their handles must be invalidated.
pub fn match_trees(
    old: &SyntaxTree,
    new: &SyntaxTree,
    spans: &[EditSpan],
) -> HashMap<RawNodeId, RawNodeId> {
    let mut pairs = HashMap::new();
    pairs.insert(old.root(), new.root());

    let mut pending = vec![(old.root(), new.root())];
    while let Some((old_parent, new_parent)) = pending.pop() {
        let candidates: Vec<RawNodeId> = new.children(new_parent).collect();
        let mut cursor = 0;

        for old_child in old.children(old_parent) {
            let Some(node) = old.get(old_child) else {
                continue;
            };
            let placement = place(node.range, spans);
            if placement == Placement::Lost {
                continue;
            }

            let found = candidates[cursor..].iter().position(|&candidate| {
                new.get(candidate).is_some_and(|n| {
                    n.kind == node.kind && fits(placement, n.range)
                })
            });
            let Some(found) = found else {
                continue;
            };

            let new_child = candidates[cursor + found];
            cursor += found + 1;
            pairs.insert(old_child, new_child);
            if matches!(placement, Placement::Kept { .. }) {
                pending.push((old_child, new_child));
            }
        }
    }

    pairs
}

fn fits(placement: Placement, range: TextRange) -> bool {
    match placement {
        Placement::Kept { starts, ends } => starts.contains(&range.pos) && ends.contains(&range.end),
        Placement::Replaced { starts, len } => starts.contains(&range.pos) && range.len() == len,
        Placement::Lost => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::{splice, validate_batch};
    use crate::syntax::SyntaxKind;
    use crate::ts::{SourceParser, TypeScriptParser};

    fn span(start: usize, old_end: usize, new_len: usize) -> EditSpan {
        EditSpan {
            start,
            old_end,
            new_len,
        }
    }

    #[test]
    fn placement_of_untouched_and_shifted_nodes() {
        let spans = [span(10, 12, 5)];
        assert_eq!(
            place(TextRange::new(0, 5), &spans),
            Placement::Kept {
                starts: [0, 0],
                ends: [5, 5]
            }
        );
        assert_eq!(
            place(TextRange::new(20, 25), &spans),
            Placement::Kept {
                starts: [23, 23],
                ends: [28, 28]
            }
        );
        assert_eq!(
            place(TextRange::new(5, 20), &spans),
            Placement::Kept {
                starts: [5, 5],
                ends: [23, 23]
            }
        );
    }

    #[test]
    fn placement_of_replaced_and_lost_nodes() {
        let spans = [span(10, 12, 5)];
        assert_eq!(
            place(TextRange::new(10, 12), &spans),
            Placement::Replaced {
                starts: [10, 10],
                len: 5
            }
        );
        assert_eq!(place(TextRange::new(11, 15), &spans), Placement::Lost);
        assert_eq!(place(TextRange::new(8, 11), &spans), Placement::Lost);
    }

    #[test]
    fn boundary_insertions_are_ambiguous() {
        let spans = [span(4, 4, 3)];
        assert_eq!(
            place(TextRange::new(4, 8), &spans),
            Placement::Kept {
                starts: [4, 7],
                ends: [11, 11]
            }
        );
        assert_eq!(
            place(TextRange::new(0, 4), &spans),
            Placement::Kept {
                starts: [0, 0],
                ends: [4, 7]
            }
        );
    }

    fn reparse(text: &str, edits: &mut Vec<TextEdit>) -> (SyntaxTree, SyntaxTree, String) {
        let mut parser = TypeScriptParser::new().unwrap();
        let old = parser.parse(text).unwrap();
        validate_batch(text, edits).unwrap();
        let new_text = splice(text, edits);
        let new = parser.parse(&new_text).unwrap();
        (old, new, new_text)
    }

    fn find(tree: &SyntaxTree, text: &str, kind: SyntaxKind, snippet: &str) -> RawNodeId {
        tree.descendants(tree.root())
            .into_iter()
            .find(|&id| tree.kind(id) == Some(kind) && tree.text(id, text) == snippet)
            .unwrap()
    }

    #[test]
    fn siblings_outside_the_edit_are_matched() {
        let text = "import { a, b } from \"m\";\nconst x = 1;\n";
        let mut edits = vec![TextEdit::insert(text, 12, "c, ")];
        let (old, new, new_text) = reparse(text, &mut edits);
        assert_eq!(new_text, "import { a, c, b } from \"m\";\nconst x = 1;\n");

        let pairs = match_trees(&old, &new, &spans_of(&edits));

        let old_b = find(&old, text, SyntaxKind::ImportSpecifier, "b");
        let new_b = find(&new, &new_text, SyntaxKind::ImportSpecifier, "b");
        assert_eq!(pairs.get(&old_b), Some(&new_b));

        let old_a = find(&old, text, SyntaxKind::ImportSpecifier, "a");
        let new_a = find(&new, &new_text, SyntaxKind::ImportSpecifier, "a");
        assert_eq!(pairs.get(&old_a), Some(&new_a));

        let old_stmt = find(&old, text, SyntaxKind::VariableStatement, "const x = 1;");
        let new_stmt = find(&new, &new_text, SyntaxKind::VariableStatement, "const x = 1;");
        assert_eq!(pairs.get(&old_stmt), Some(&new_stmt));
    }

    #[test]
    fn deleted_nodes_have_no_counterpart() {
        let text = "import { a, b } from \"m\";\n";
        let mut edits = vec![TextEdit::delete(text, TextRange::new(9, 12))];
        let (old, new, new_text) = reparse(text, &mut edits);
        assert_eq!(new_text, "import { b } from \"m\";\n");

        let pairs = match_trees(&old, &new, &spans_of(&edits));
        let old_a = find(&old, text, SyntaxKind::ImportSpecifier, "a");
        let old_b = find(&old, text, SyntaxKind::ImportSpecifier, "b");
        assert!(!pairs.contains_key(&old_a));
        assert!(pairs.contains_key(&old_b));
        assert_eq!(pairs.get(&old.root()), Some(&new.root()));
    }

    #[test]
    fn renamed_identifier_keeps_its_counterpart() {
        let text = "const value = 1;\n";
        let mut edits = vec![TextEdit::replace(text, TextRange::new(6, 11), "renamed")];
        let (old, new, new_text) = reparse(text, &mut edits);

        let pairs = match_trees(&old, &new, &spans_of(&edits));
        let old_id = find(&old, text, SyntaxKind::Identifier, "value");
        let new_id = find(&new, &new_text, SyntaxKind::Identifier, "renamed");
        assert_eq!(pairs.get(&old_id), Some(&new_id));
    }
}
