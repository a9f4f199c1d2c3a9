use crate::error::{StoreError, StoreResult};
use crate::metadata::EntryMetadata;

/// An open entry returned by [`MetadataStore::create_entry`].
///
/// The handle must be passed back to [`MetadataStore::close_entry`] exactly
/// once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryHandle {
    pub path: String,
    pub token: u64,
}

/// External store receiving translated entry paths and their metadata.
///
/// All implementations must satisfy these invariants:
/// - Entry paths are absolute (`/a/b.h5`) and never contain `.` or `..`
///   components.
/// - Metadata is attached to an existing entry only; attaching replaces any
///   earlier metadata for that entry.
/// - Concurrent calls on disjoint paths are safe.
pub trait MetadataStore: Send + Sync {
    /// Create an empty entry at `path` and return an open handle to it.
    fn create_entry(&self, path: &str) -> StoreResult<EntryHandle>;

    /// Close a handle returned by `create_entry`.
    fn close_entry(&self, handle: EntryHandle) -> StoreResult<()>;

    /// Attach metadata to the entry at `path`.
    fn attach_metadata(&self, path: &str, metadata: &EntryMetadata) -> StoreResult<()>;

    /// Read back the metadata attached to `path`.
    ///
    /// Returns `Ok(None)` if the entry exists without metadata and
    /// `Err(NotFound)` if the entry does not exist.
    fn read_metadata(&self, path: &str) -> StoreResult<Option<EntryMetadata>>;

    /// Check whether an entry exists at `path`.
    fn exists(&self, path: &str) -> StoreResult<bool>;
}

/// Reject paths that are relative, empty or escape the store namespace.
pub fn validate_path(path: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };
    if !path.starts_with('/') {
        return Err(invalid("must be absolute"));
    }
    if path.trim_end_matches('/').is_empty() {
        return Err(invalid("names the store root"));
    }
    if path.split('/').any(|c| c == "." || c == "..") {
        return Err(invalid("contains a relative component"));
    }
    if path.contains('\0') {
        return Err(invalid("contains a NUL byte"));
    }
    Ok(())
}
