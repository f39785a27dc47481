use thiserror::Error as ThisError;

/// Failure conditions of the Christofides pipeline.
///
/// Local search operators are total over structurally valid tours and never
/// return these; only graph construction and the pipeline stages do.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("graph is not fully connected: {0}")]
    DisconnectedGraph(String),
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
    #[error("invalid perfect matching: {0}")]
    InvalidMatching(String),
    #[error("eulerian traversal incomplete: {0}")]
    IncompleteTraversal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalInvariant(message.into())
    }
}
