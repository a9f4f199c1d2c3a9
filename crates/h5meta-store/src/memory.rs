use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::metadata::EntryMetadata;
use crate::traits::{validate_path, EntryHandle, MetadataStore};

/// In-memory metadata store.
///
/// Intended for tests and embedding. Entries are kept in a `BTreeMap` behind
/// a `RwLock`. Creating an entry that already exists fails with
/// [`StoreError::AlreadyExists`].
pub struct InMemoryMetadataStore {
    entries: RwLock<BTreeMap<String, Option<EntryMetadata>>>,
    open: RwLock<HashSet<u64>>,
    next_token: AtomicU64,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            open: RwLock::new(HashSet::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// All entry paths in sorted order.
    pub fn paths(&self) -> Vec<String> {
        self.entries
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Number of handles created but not yet closed.
    pub fn open_handles(&self) -> usize {
        self.open.read().expect("lock poisoned").len()
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataStore for InMemoryMetadataStore {
    fn create_entry(&self, path: &str) -> StoreResult<EntryHandle> {
        validate_path(path)?;
        let mut entries = self.entries.write().expect("lock poisoned");
        if entries.contains_key(path) {
            return Err(StoreError::AlreadyExists {
                path: path.to_string(),
            });
        }
        entries.insert(path.to_string(), None);

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.open.write().expect("lock poisoned").insert(token);
        Ok(EntryHandle {
            path: path.to_string(),
            token,
        })
    }

    fn close_entry(&self, handle: EntryHandle) -> StoreResult<()> {
        if self.open.write().expect("lock poisoned").remove(&handle.token) {
            Ok(())
        } else {
            Err(StoreError::UnknownHandle(handle.token))
        }
    }

    fn attach_metadata(&self, path: &str, metadata: &EntryMetadata) -> StoreResult<()> {
        let mut entries = self.entries.write().expect("lock poisoned");
        let slot = entries.get_mut(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;
        *slot = Some(metadata.clone());
        Ok(())
    }

    fn read_metadata(&self, path: &str) -> StoreResult<Option<EntryMetadata>> {
        let entries = self.entries.read().expect("lock poisoned");
        entries
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.entries.read().expect("lock poisoned").contains_key(path))
    }
}

impl std::fmt::Debug for InMemoryMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMetadataStore")
            .field("entry_count", &self.len())
            .field("open_handles", &self.open_handles())
            .finish()
    }
}
