//! Insert into and remove from delimited, comma-separated lists.
//!
//! The editor only sees delimiter and element ranges, so it serves named
//! imports, object literals, argument lists and the like alike.

use crate::config::FormattingSettings;
use crate::edit::TextEdit;
use crate::manipulation::errors::{ManipulationError, Result};
use crate::range::TextRange;
use crate::syntax::{RawNodeId, SyntaxKind, SyntaxTree};
use std::collections::BTreeSet;

/// A delimited list as seen in one text snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommaList {
    /// Opening delimiter token, e.g. `{`
    pub open: TextRange,
    /// Closing delimiter token, e.g. `}`
    pub close: TextRange,
    pub elements: Vec<TextRange>,
    braces: bool,
}

impl CommaList {
    pub fn new(open: TextRange, close: TextRange, elements: Vec<TextRange>, braces: bool) -> Self {
        Self {
            open,
            close,
            elements,
            braces,
        }
    }

    /// Read the list shape of a delimited node such as `named_imports`.
    ///
    /// Returns `None` if the node has no opening and closing delimiter.
    pub fn from_node(tree: &SyntaxTree, id: RawNodeId) -> Option<Self> {
        let children: Vec<RawNodeId> = tree.children(id).collect();
        let open = *children.first()?;
        let close = *children.last()?;
        let open_kind = tree.kind(open)?;
        if !matches!(open_kind, SyntaxKind::Token("{" | "(" | "[")) || open == close {
            return None;
        }
        if !matches!(tree.kind(close)?, SyntaxKind::Token("}" | ")" | "]")) {
            return None;
        }

        let elements = tree
            .named_children(id)
            .filter_map(|child| tree.range(child))
            .collect();

        Some(Self::new(
            tree.range(open)?,
            tree.range(close)?,
            elements,
            open_kind == SyntaxKind::Token("{"),
        ))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Span between the delimiters.
    pub fn interior(&self) -> TextRange {
        TextRange::new(self.open.end, self.close.pos)
    }
}

/// Plan the insertion of already rendered items at `index` (`0..=len`).
pub fn insert_elements(
    text: &str,
    list: &CommaList,
    index: usize,
    rendered: &[String],
    settings: &FormattingSettings,
) -> Result<Vec<TextEdit>> {
    if index > list.len() {
        return Err(ManipulationError::argument_range(format!(
            "insert index {index} is outside 0..={}",
            list.len()
        )));
    }
    if rendered.is_empty() {
        return Ok(Vec::new());
    }

    if list.is_empty() {
        return Ok(replace_elements(text, list, rendered, settings));
    }

    let separator = settings.comma_separator();
    let joined = rendered.join(separator);
    let edit = if index < list.len() {
        TextEdit::insert(text, list.elements[index].pos, format!("{joined}{separator}"))
    } else {
        let last = list.elements[list.len() - 1];
        TextEdit::insert(text, last.end, format!("{separator}{joined}"))
    };

    Ok(vec![edit])
}

/// Plan a single edit rewriting the whole interior with `rendered`.
///
/// Braced lists get the configured padding; an empty `rendered` leaves the
/// bare delimiters.
pub fn replace_elements(
    text: &str,
    list: &CommaList,
    rendered: &[String],
    settings: &FormattingSettings,
) -> Vec<TextEdit> {
    let joined = rendered.join(settings.comma_separator());
    let filled = if list.braces {
        let braced = settings.braced(&joined);
        braced[1..braced.len() - 1].to_string()
    } else {
        joined
    };
    vec![TextEdit::replace(text, list.interior(), filled)]
}

/// Plan the removal of the elements at `indices`.
///
/// Duplicate indices are ignored; any index outside the list rejects the
/// whole request.
pub fn remove_elements(text: &str, list: &CommaList, indices: &[usize]) -> Result<Vec<TextEdit>> {
    let removed: BTreeSet<usize> = indices.iter().copied().collect();
    if let Some(&bad) = removed.iter().find(|&&i| i >= list.len()) {
        return Err(ManipulationError::argument_range(format!(
            "remove index {bad} is outside 0..{}",
            list.len()
        )));
    }
    if removed.is_empty() {
        return Ok(Vec::new());
    }
    if removed.len() == list.len() {
        return Ok(vec![TextEdit::delete(text, list.interior())]);
    }

    let mut edits = Vec::new();
    let mut runs: Vec<(usize, usize)> = Vec::new();
    for &index in &removed {
        match runs.last_mut() {
            Some((_, last)) if *last + 1 == index => *last = index,
            _ => runs.push((index, index)),
        }
    }

    for (first, last) in runs.into_iter().rev() {
        let start = list.elements[first].pos;
        let end = list.elements[last].end;

        if last + 1 < list.len() {
            // Comments after the comma belong to the next element, comments
            // before it stay where they are.
            let next = list.elements[last + 1].pos;
            let gap = &text[end..next];
            match separator_comma(gap) {
                Some(comma) if !gap[..comma].trim().is_empty() => {
                    let blanks = gap.len() - gap.trim_start().len();
                    edits.push(TextEdit::delete(text, TextRange::new(start, end + blanks)));
                    edits.push(TextEdit::delete(
                        text,
                        TextRange::new(end + comma, end + comma + 1),
                    ));
                }
                Some(comma) => {
                    let after = &gap[comma + 1..];
                    let blanks = after.len() - after.trim_start().len();
                    edits.push(TextEdit::delete(
                        text,
                        TextRange::new(start, end + comma + 1 + blanks),
                    ));
                }
                None => edits.push(TextEdit::delete(text, TextRange::new(start, next))),
            }
        } else {
            let prev = list.elements[first - 1].end;
            let gap = &text[prev..start];
            let from = match separator_comma(gap) {
                Some(comma) if !gap[..comma].trim().is_empty() => prev + comma,
                _ => prev,
            };
            edits.push(TextEdit::delete(text, TextRange::new(from, end)));
        }
    }

    Ok(edits)
}

/// Offset of the comma separating two elements, skipping commas in comments.
fn separator_comma(gap: &str) -> Option<usize> {
    let bytes = gap.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b',', _) => return Some(i),
            (b'/', Some(b'*')) => {
                i = gap[i + 2..].find("*/").map_or(bytes.len(), |j| i + 2 + j + 2);
            }
            (b'/', Some(b'/')) => {
                i = gap[i..].find('\n').map_or(bytes.len(), |j| i + j);
            }
            _ => i += 1,
        }
    }
    None
}
