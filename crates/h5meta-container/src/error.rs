use h5meta_types::ObjectKind;

/// Errors from container reader operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The container file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No object exists at the given path.
    #[error("object not found: {path}")]
    NotFound { path: String },

    /// The object exists but is of a different kind than requested.
    #[error("{path} is a {found}, expected a {expected}")]
    WrongKind {
        path: String,
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// The object has no attribute with this name.
    #[error("attribute {name:?} not found on {object}")]
    AttributeNotFound { object: String, name: String },

    /// The container description could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The object exists but its header or data is unreadable.
    #[error("corrupt object {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Result alias for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
