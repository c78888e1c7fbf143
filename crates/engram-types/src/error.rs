use thiserror::Error;

/// Errors from repository operations (used by trait definitions in engram-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors from user-facing memory mutations.
///
/// These are the only memory errors that propagate to a caller; background
/// extraction failures are logged and swallowed at the task boundary.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("memory not found")]
    NotFound,

    #[error("memory content cannot be empty")]
    EmptyContent,

    #[error("memory content exceeds {max} characters")]
    ContentTooLong { max: usize },

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for MemoryError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => MemoryError::NotFound,
            other => MemoryError::Storage(other.to_string()),
        }
    }
}
