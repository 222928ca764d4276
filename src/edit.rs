use crate::range::TextRange;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// A planned replacement of one byte span, checked against the text it was
/// planned from before it is applied.
///
/// Structural operations compile down to batches of these; all the syntax
/// knowledge sits in choosing the span.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextEdit does nothing until it is applied to a source file"]
pub struct TextEdit {
    /// Span to replace, in the coordinates of the text it was planned against
    pub range: TextRange,
    /// Replacement text for `range`
    pub new_text: String,
    /// What must sit at `range` when the edit is applied
    pub expected_before: EditVerification,
}

/// Spans longer than this are checked by hash instead of by copy.
const HASHED_SPAN_LEN: usize = 1024;

/// Expected contents of an edit's span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    ExactMatch(String),
    /// xxh3 of the span text
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    pub fn from_text(text: &str) -> Self {
        if text.len() > HASHED_SPAN_LEN {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("before-text verification failed at {range}: expected {expected}, found {found:?}")]
    BeforeTextMismatch {
        range: TextRange,
        expected: String,
        found: String,
    },

    #[error("invalid byte range {range} in text of length {text_len}")]
    InvalidByteRange { range: TextRange, text_len: usize },

    #[error("edits overlap: {first} and {second}")]
    Overlapping { first: TextRange, second: TextRange },

    #[error("edit at {0} does not fall on a UTF-8 character boundary")]
    NotCharBoundary(TextRange),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TextEdit {
    /// Plan a replacement of `range` in `text`, capturing the current span
    /// text as the expected before-text.
    pub fn replace(text: &str, range: TextRange, new_text: impl Into<String>) -> Self {
        let before = text.get(range.as_range()).unwrap_or_default();
        Self {
            range,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(before),
        }
    }

    /// Plan an insertion at `pos`.
    pub fn insert(text: &str, pos: usize, new_text: impl Into<String>) -> Self {
        Self::replace(text, TextRange::empty(pos), new_text)
    }

    /// Plan a deletion of `range`.
    pub fn delete(text: &str, range: TextRange) -> Self {
        Self::replace(text, range, String::new())
    }

    /// Edit whose expected before-text is supplied by the caller.
    pub fn with_verification(
        range: TextRange,
        new_text: impl Into<String>,
        verification: EditVerification,
    ) -> Self {
        Self {
            range,
            new_text: new_text.into(),
            expected_before: verification,
        }
    }

    /// True when the text already holds `new_text` at `range`.
    pub fn is_noop(&self, text: &str) -> bool {
        text.get(self.range.as_range()) == Some(self.new_text.as_str())
    }

    /// Current span text, if the edit may be applied to `text`.
    fn validate<'a>(&self, text: &'a str) -> Result<&'a str, EditError> {
        if self.range.pos > self.range.end || self.range.end > text.len() {
            return Err(EditError::InvalidByteRange {
                range: self.range,
                text_len: text.len(),
            });
        }

        let current = text
            .get(self.range.as_range())
            .ok_or(EditError::NotCharBoundary(self.range))?;

        // Already applied.
        if current == self.new_text {
            return Ok(current);
        }

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                range: self.range,
                expected: match &self.expected_before {
                    EditVerification::ExactMatch(s) => format!("{s:?}"),
                    EditVerification::Hash(h) => format!("text hashing to {h:#018x}"),
                },
                found: current.to_string(),
            });
        }

        Ok(current)
    }
}

/// Validate a batch of edits against `text` and order them for application.
///
/// Edits are sorted by start offset descending so that applying them in
/// order never shifts a later edit's coordinates. Overlapping spans and
/// out-of-bounds ranges are rejected before anything is touched. Two
/// insertions at the same offset count as overlapping since their order
/// would be ambiguous.
pub fn validate_batch(text: &str, edits: &mut [TextEdit]) -> Result<(), EditError> {
    for edit in edits.iter() {
        edit.validate(text)?;
    }

    edits.sort_by(|a, b| b.range.pos.cmp(&a.range.pos).then(b.range.end.cmp(&a.range.end)));

    for window in edits.windows(2) {
        let (later, earlier) = (&window[0], &window[1]);
        let same_point = earlier.range.is_empty()
            && later.range.is_empty()
            && earlier.range.pos == later.range.pos;
        if earlier.range.end > later.range.pos || same_point {
            return Err(EditError::Overlapping {
                first: earlier.range,
                second: later.range,
            });
        }
    }

    Ok(())
}

/// Splice already-validated edits (sorted descending) into `text`.
pub fn splice(text: &str, edits: &[TextEdit]) -> String {
    let mut new_text = text.to_string();
    for edit in edits {
        new_text.replace_range(edit.range.as_range(), &edit.new_text);
    }
    new_text
}

/// Replace the file at `path` with `content` through a synced sibling
/// tempfile, so readers see either the old file or the new one.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
