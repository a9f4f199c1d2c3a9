/// Errors from metadata store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An entry already exists at the path and the backend does not overwrite.
    #[error("entry already exists: {path}")]
    AlreadyExists { path: String },

    /// No entry exists at the path.
    #[error("entry not found: {path}")]
    NotFound { path: String },

    /// The path is not a valid absolute entry path.
    #[error("invalid entry path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The handle was never issued by this store or is already closed.
    #[error("unknown entry handle {0}")]
    UnknownHandle(u64),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
