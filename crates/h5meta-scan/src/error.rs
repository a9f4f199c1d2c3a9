//! Error types for the scan crate.

use h5meta_container::ContainerError;
use h5meta_types::{DatatypeClass, FailureKind, NodeFailure};

/// Errors from decoding a typed value.
///
/// These never abort a walk; the walker records them inline on the node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The datatype class (or its width) has no decoder.
    #[error("unsupported datatype: {class} of {size} bytes")]
    UnsupportedType { class: DatatypeClass, size: usize },

    /// Declared size times element count does not match the stored bytes.
    #[error("malformed attribute: declared {expected} bytes, stored {actual}")]
    MalformedAttribute { expected: u64, actual: usize },

    /// The dataspace extents multiply past `u64::MAX`.
    #[error("malformed attribute: dataspace {dataspace} has too many elements")]
    ExtentOverflow { dataspace: String },

    /// A zero-width string type declares a nonzero element count.
    #[error("malformed attribute: {elements} elements of a zero-width string")]
    ZeroWidthString { elements: u64 },
}

impl DecodeError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::UnsupportedType { .. } => FailureKind::UnsupportedType,
            Self::MalformedAttribute { .. }
            | Self::ExtentOverflow { .. }
            | Self::ZeroWidthString { .. } => FailureKind::MalformedAttribute,
        }
    }

    /// Convert into the inline form stored in a metadata record.
    pub fn to_failure(&self) -> NodeFailure {
        NodeFailure::new(self.failure_kind(), self.to_string())
    }
}

/// Result alias for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors that abort the walk of one container file.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The root group could not be opened; nothing can be walked.
    #[error("cannot open root group of {path}: {source}")]
    RootUnavailable {
        path: String,
        #[source]
        source: ContainerError,
    },
}

/// Result alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;
