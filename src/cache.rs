//! Per-thread store of compiled TypeScript search patterns.
//!
//! Lookups by `SourceFile::find_node` repeat the same few patterns across
//! many files, so compilation happens once per thread. The store holds at
//! most 256 patterns and starts over when full.

use crate::sg::{typescript, AstGrepError};
use ast_grep_core::Pattern;
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_PATTERNS: usize = 256;

thread_local! {
    static COMPILED: RefCell<HashMap<String, Pattern>> = RefCell::new(HashMap::new());
}

/// Compiled form of `source`, reusing an earlier compilation on this thread.
///
/// A pattern that fails to compile is reported and not stored.
pub fn compiled_pattern(source: &str) -> Result<Pattern, AstGrepError> {
    COMPILED.with(|store| {
        let mut store = store.borrow_mut();
        if let Some(pattern) = store.get(source) {
            return Ok(pattern.clone());
        }

        let pattern =
            Pattern::try_new(source, typescript()).map_err(|e| AstGrepError::InvalidPattern {
                pattern: source.to_string(),
                message: e.to_string(),
            })?;

        if store.len() >= MAX_PATTERNS {
            store.clear();
        }
        store.insert(source.to_string(), pattern.clone());
        Ok(pattern)
    })
}

/// Number of patterns compiled on this thread.
pub fn compiled_count() -> usize {
    COMPILED.with(|store| store.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_patterns_compile_once() {
        let before = compiled_count();
        compiled_pattern("foo($A)").unwrap();
        compiled_pattern("foo($A)").unwrap();
        assert_eq!(compiled_count(), before + 1);
        compiled_pattern("bar($A)").unwrap();
        assert_eq!(compiled_count(), before + 2);
    }

    #[test]
    fn broken_patterns_are_not_stored() {
        let before = compiled_count();
        let err = compiled_pattern("").unwrap_err();
        assert!(matches!(err, AstGrepError::InvalidPattern { .. }));
        assert_eq!(compiled_count(), before);
    }
}
