use std::path::PathBuf;

use h5meta_store::StoreError;

/// Errors from reading or discovering the manifest.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The manifest could not be opened, read or written.
    #[error("manifest I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be traversed during discovery.
    #[error("cannot walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors from loading a scan configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {detail}")]
    Parse { path: PathBuf, detail: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// The entry could not be created or closed in the metadata store.
///
/// The file is counted as failed.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("cannot create store entry {path}: {source}")]
    StoreCreate {
        path: String,
        #[source]
        source: StoreError,
    },
}

/// Errors that abort a whole run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Worker index or count outside the valid range.
    #[error("invalid partition: worker {index} of {count}")]
    InvalidPartition { index: usize, count: usize },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A worker thread could not be started.
    #[error("cannot spawn worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before returning its summary.
    #[error("worker {index} panicked")]
    WorkerPanicked { index: usize },
}

/// Result alias for run-level operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
