//! Text range primitives.
//!
//! Offsets are byte offsets into the source text the range was read from.
//! A range is only meaningful for the text snapshot it came from; after an
//! edit it must be read again from the live node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range `[pos, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TextRange {
    pub pos: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(pos: usize, end: usize) -> Self {
        Self { pos, end }
    }

    /// Empty range at `pos`.
    pub const fn empty(pos: usize) -> Self {
        Self { pos, end: pos }
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    pub const fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    /// True when `other` lies entirely within `self`.
    pub const fn contains_range(&self, other: TextRange) -> bool {
        self.pos <= other.pos && other.end <= self.end
    }

    /// True when the two ranges share at least one byte.
    pub const fn intersects(&self, other: TextRange) -> bool {
        self.pos < other.end && other.pos < self.end
    }

    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.pos..self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.pos, self.end)
    }
}

impl From<std::ops::Range<usize>> for TextRange {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// Quote character used for string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteKind {
    #[default]
    Double,
    Single,
}

impl QuoteKind {
    pub const fn as_char(self) -> char {
        match self {
            QuoteKind::Double => '"',
            QuoteKind::Single => '\'',
        }
    }

    /// Classify the quote character of a string literal's source text.
    pub fn of_literal(text: &str) -> Option<Self> {
        match text.chars().next()? {
            '"' => Some(QuoteKind::Double),
            '\'' => Some(QuoteKind::Single),
            _ => None,
        }
    }

    /// Render `value` as a literal with this quote, escaping the quote
    /// character and backslashes.
    pub fn quote(self, value: &str) -> String {
        let q = self.as_char();
        let mut out = String::with_capacity(value.len() + 2);
        out.push(q);
        for c in value.chars() {
            if c == q || c == '\\' {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(q);
        out
    }
}

/// Strip the surrounding quotes from a string literal's text.
pub fn literal_value(text: &str) -> &str {
    match QuoteKind::of_literal(text) {
        Some(kind) => {
            let inner = &text[1..];
            inner.strip_suffix(kind.as_char()).unwrap_or(inner)
        }
        None => text,
    }
}

/// Byte offset of the start of the line containing `pos`.
pub fn line_start(text: &str, pos: usize) -> usize {
    text[..pos.min(text.len())]
        .rfind('\n')
        .map_or(0, |i| i + 1)
}

/// Byte offset just past the line break following `pos`, or the text length.
pub fn next_line_start(text: &str, pos: usize) -> usize {
    let pos = pos.min(text.len());
    text[pos..].find('\n').map_or(text.len(), |i| pos + i + 1)
}

/// Leading whitespace of the line containing `pos`.
pub fn indentation_at(text: &str, pos: usize) -> &str {
    let start = line_start(text, pos);
    let line = &text[start..];
    let width = line
        .char_indices()
        .find(|(_, c)| *c != ' ' && *c != '\t')
        .map_or(line.len(), |(i, _)| i);
    &line[..width]
}

/// Range to delete when removing a whole statement.
///
/// Trailing blanks and one line break are included when nothing else follows
/// the statement on its line.
pub fn statement_removal_range(text: &str, range: TextRange) -> TextRange {
    let rest = &text[range.end.min(text.len())..];
    let blanks = rest
        .char_indices()
        .find(|(_, c)| *c != ' ' && *c != '\t')
        .map_or(rest.len(), |(i, _)| i);
    let after = &rest[blanks..];

    let end = if after.is_empty() || after.starts_with('\n') || after.starts_with("\r\n") {
        next_line_start(text, range.end)
    } else {
        range.end
    };

    TextRange::new(range.pos, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_relations() {
        let outer = TextRange::new(2, 10);
        assert!(outer.contains_range(TextRange::new(2, 10)));
        assert!(outer.contains_range(TextRange::empty(10)));
        assert!(!outer.contains_range(TextRange::new(1, 3)));
        assert!(outer.intersects(TextRange::new(9, 12)));
        assert!(!outer.intersects(TextRange::new(10, 12)));
        assert_eq!(outer.len(), 8);
    }

    #[test]
    fn quote_detection_and_rendering() {
        assert_eq!(QuoteKind::of_literal("'./a'"), Some(QuoteKind::Single));
        assert_eq!(QuoteKind::of_literal("\"./a\""), Some(QuoteKind::Double));
        assert_eq!(QuoteKind::of_literal("a"), None);
        assert_eq!(QuoteKind::Single.quote("it's"), "'it\\'s'");
        assert_eq!(QuoteKind::Double.quote("./x"), "\"./x\"");
    }

    #[test]
    fn literal_value_strips_quotes() {
        assert_eq!(literal_value("'./test'"), "./test");
        assert_eq!(literal_value("\"\""), "");
        assert_eq!(literal_value("plain"), "plain");
    }

    #[test]
    fn line_helpers() {
        let text = "a;\n    b;\nc;";
        assert_eq!(line_start(text, 8), 3);
        assert_eq!(next_line_start(text, 4), 10);
        assert_eq!(next_line_start(text, 11), text.len());
        assert_eq!(indentation_at(text, 8), "    ");
        assert_eq!(indentation_at(text, 0), "");
    }

    #[test]
    fn statement_removal_takes_line_break() {
        let text = "a;\nb;  \nc;";
        assert_eq!(statement_removal_range(text, TextRange::new(3, 5)), TextRange::new(3, 8));
        assert_eq!(statement_removal_range(text, TextRange::new(8, 10)), TextRange::new(8, 10));

        let crlf = "a;\r\nb;";
        assert_eq!(statement_removal_range(crlf, TextRange::new(0, 2)), TextRange::new(0, 4));

        let inline = "a; b;";
        assert_eq!(statement_removal_range(inline, TextRange::new(0, 2)), TextRange::new(0, 2));
    }
}
