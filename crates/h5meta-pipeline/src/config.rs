use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use h5meta_container::{ContainerReader, JsonContainerReader};
use h5meta_store::{FsMetadataStore, InMemoryMetadataStore, MetadataStore, StoreResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::DEFAULT_MANIFEST;
use crate::error::{ConfigError, ConfigResult};
use crate::translate::PathMapping;

/// Configuration of a scan run, usually loaded from a TOML file.
///
/// ```toml
/// manifest = "path.log"
/// workers = 4
///
/// [mapping]
/// source_root = "/BIGDATA/benchmarks"
/// target_root = "/H5test"
///
/// [store]
/// kind = "directory"
/// root = "h5meta-store"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Manifest listing the container files to scan.
    pub manifest: PathBuf,
    pub mapping: PathMapping,
    /// Number of local worker threads.
    pub workers: usize,
    pub store: StoreConfig,
    pub reader: ReaderKind,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            mapping: PathMapping::default(),
            workers: 1,
            store: StoreConfig::default(),
            reader: ReaderKind::default(),
        }
    }
}

/// Which metadata store backend to publish into.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
    Memory,
    Directory { root: PathBuf },
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Directory {
            root: PathBuf::from("h5meta-store"),
        }
    }
}

/// Container reader backend for files on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReaderKind {
    #[default]
    Json,
}

impl ScanConfig {
    /// Load a configuration file; an empty file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { detail, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                detail,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidValue("workers must be at least 1".into()));
        }
        if !self.mapping.target_root.is_empty() && !self.mapping.target_root.starts_with('/') {
            return Err(ConfigError::InvalidValue(format!(
                "mapping.target_root must be absolute, got {:?}",
                self.mapping.target_root
            )));
        }
        Ok(())
    }

    /// Open the configured metadata store.
    pub fn open_store(&self) -> StoreResult<Arc<dyn MetadataStore>> {
        Ok(match &self.store {
            StoreConfig::Memory => Arc::new(InMemoryMetadataStore::new()),
            StoreConfig::Directory { root } => Arc::new(FsMetadataStore::open(root.clone())?),
        })
    }

    /// The configured container reader.
    pub fn open_reader(&self) -> Arc<dyn ContainerReader> {
        match self.reader {
            ReaderKind::Json => Arc::new(JsonContainerReader::new()),
        }
    }
}
