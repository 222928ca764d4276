use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AstGrepError {
    #[error("pattern `{pattern}` does not compile: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("pattern `{pattern}` matched {count} nodes, expected exactly one")]
    AmbiguousMatch { pattern: String, count: usize },

    #[error("pattern `{pattern}` matched no node")]
    NoMatch { pattern: String },
}
