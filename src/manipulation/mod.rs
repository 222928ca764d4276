//! Edit planning helpers and the reparse/remap engine.
//!
//! Structural operations on node views plan plain [`TextEdit`]s; the engine
//! applies a whole batch at once, reparses, and rebinds the file's node
//! handles onto the new tree.
//!
//! [`TextEdit`]: crate::edit::TextEdit

pub mod comma_list;
pub mod engine;
pub mod errors;
pub mod remap;

pub use comma_list::{insert_elements, remove_elements, replace_elements, CommaList};
pub use engine::FileState;
pub use errors::{ManipulationError, Result};
