use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::metadata::EntryMetadata;
use crate::traits::{validate_path, EntryHandle, MetadataStore};

/// Suffix of the sidecar file holding an entry's metadata.
pub const SIDECAR_SUFFIX: &str = ".meta.json";

/// Metadata store backed by a local directory.
///
/// Each entry is an empty file under `root` at the entry path; its metadata
/// lives next to it in a `<name>.meta.json` sidecar. Creating an entry that
/// already exists truncates it and drops its old metadata.
pub struct FsMetadataStore {
    root: PathBuf,
    open: Mutex<HashMap<u64, File>>,
    next_token: AtomicU64,
}

impl FsMetadataStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened directory store");
        Ok(Self {
            root,
            open: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of the entry at `path`.
    pub fn entry_file(&self, path: &str) -> StoreResult<PathBuf> {
        validate_path(path)?;
        Ok(self.root.join(path.trim_start_matches('/')))
    }

    fn sidecar_file(&self, path: &str) -> StoreResult<PathBuf> {
        let mut name = self.entry_file(path)?.into_os_string();
        name.push(SIDECAR_SUFFIX);
        Ok(PathBuf::from(name))
    }

    fn existing_entry(&self, path: &str) -> StoreResult<PathBuf> {
        let entry = self.entry_file(path)?;
        if entry.is_file() {
            Ok(entry)
        } else {
            Err(StoreError::NotFound {
                path: path.to_string(),
            })
        }
    }

    /// Number of handles created but not yet closed.
    pub fn open_handles(&self) -> usize {
        self.open.lock().expect("lock poisoned").len()
    }
}

impl MetadataStore for FsMetadataStore {
    fn create_entry(&self, path: &str) -> StoreResult<EntryHandle> {
        let entry = self.entry_file(path)?;
        if let Some(parent) = entry.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&entry)?;
        let sidecar = self.sidecar_file(path)?;
        if sidecar.exists() {
            fs::remove_file(&sidecar)?;
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.open.lock().expect("lock poisoned").insert(token, file);
        debug!(path, token, "created entry");
        Ok(EntryHandle {
            path: path.to_string(),
            token,
        })
    }

    fn close_entry(&self, handle: EntryHandle) -> StoreResult<()> {
        let file = self
            .open
            .lock()
            .expect("lock poisoned")
            .remove(&handle.token)
            .ok_or(StoreError::UnknownHandle(handle.token))?;
        file.sync_all()?;
        Ok(())
    }

    fn attach_metadata(&self, path: &str, metadata: &EntryMetadata) -> StoreResult<()> {
        self.existing_entry(path)?;
        let sidecar = self.sidecar_file(path)?;
        let json = serde_json::to_vec_pretty(metadata)?;

        // Write-then-rename.
        let mut tmp_name = sidecar.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        let mut file = File::create(&tmp)?;
        file.write_all(&json)?;
        file.sync_all()?;
        fs::rename(&tmp, &sidecar)?;

        debug!(path, entries = metadata.len(), "attached metadata");
        Ok(())
    }

    fn read_metadata(&self, path: &str) -> StoreResult<Option<EntryMetadata>> {
        self.existing_entry(path)?;
        let sidecar = self.sidecar_file(path)?;
        if !sidecar.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&sidecar)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn exists(&self, path: &str) -> StoreResult<bool> {
        Ok(self.entry_file(path)?.is_file())
    }
}

impl std::fmt::Debug for FsMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsMetadataStore")
            .field("root", &self.root)
            .field("open_handles", &self.open_handles())
            .finish()
    }
}
