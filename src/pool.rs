//! Thread-local parser pooling.
//!
//! Creates a TypeScript parser on first use per thread and reuses it for
//! every later parse on that thread.

use crate::ts::{TreeSitterError, TypeScriptParser};
use std::cell::RefCell;

thread_local! {
    static TS_PARSER: RefCell<Option<TypeScriptParser>> = const { RefCell::new(None) };
}

/// Execute function with pooled parser instance.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use syntax_morph::pool::with_parser;
/// use syntax_morph::ts::SourceParser;
///
/// let tree = with_parser(|parser| parser.parse("const a = 1;"))??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut TypeScriptParser) -> R,
{
    TS_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        let parser = match slot.take() {
            Some(parser) => parser,
            None => TypeScriptParser::new()?,
        };
        Ok(f(slot.insert(parser)))
    })
}
