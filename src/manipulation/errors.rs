use crate::binder::ReferenceError;
use crate::edit::EditError;
use crate::sg::AstGrepError;
use crate::syntax::SyntaxKind;
use crate::ts::TreeSitterError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ManipulationError> = std::result::Result<T, E>;

/// Errors raised by node operations.
///
/// Every variant is detected before the source text is touched.
#[derive(Error, Debug)]
pub enum ManipulationError {
    #[error("node was removed or replaced by an earlier edit")]
    InvalidatedNode,

    #[error("argument out of range: {message}")]
    ArgumentRange { message: String },

    #[error("structural conflict: {message}")]
    StructuralConflict { message: String },

    #[error(transparent)]
    ReferenceResolution(#[from] ReferenceError),

    #[error("node no longer exists after edit: {message}")]
    NodeNoLongerExists { message: String },

    #[error("expected {expected} node, found {found}")]
    WrongKind {
        expected: &'static str,
        found: SyntaxKind,
    },

    #[error("expected to find {what}")]
    MissingChild { what: &'static str },

    #[error("edit rejected: {0}")]
    Edit(EditError),

    #[error("parse failed: {0}")]
    Parse(#[from] TreeSitterError),

    #[error("pattern query failed: {0}")]
    Pattern(#[from] AstGrepError),

    #[error("source file has no path to save to")]
    NoPath,

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ManipulationError {
    pub(crate) fn argument_range(message: impl Into<String>) -> Self {
        ManipulationError::ArgumentRange {
            message: message.into(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        ManipulationError::StructuralConflict {
            message: message.into(),
        }
    }
}

impl From<EditError> for ManipulationError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::InvalidByteRange { .. }
            | EditError::Overlapping { .. }
            | EditError::NotCharBoundary(_) => ManipulationError::ArgumentRange {
                message: err.to_string(),
            },
            other => ManipulationError::Edit(other),
        }
    }
}
